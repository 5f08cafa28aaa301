//! Session history storage and the read-only query interface

mod error;
mod query;
mod storage;

pub use error::{HistoryError, HistoryResult};
pub use query::{HistoryQuery, ObservationFilter, ProjectScope};
pub use storage::SqliteHistory;
