//! History record types, token accounting and filesystem helpers

mod io;
mod paths;
mod tokens;
mod types;

pub use io::{atomic_write, last_assistant_message};
pub use paths::{Paths, CLAUDE_CONFIG_DIR_ENV, DATA_DIR_ENV};
pub use tokens::{estimate_read_tokens, round_half_up, TokenEconomics, CHARS_PER_TOKEN};
pub use types::{Observation, SessionSummary};
