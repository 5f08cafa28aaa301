pub mod context;
pub mod hooks;
pub mod version;
