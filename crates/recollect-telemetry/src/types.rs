//! Captured history records

use serde::{Deserialize, Serialize};

/// A single captured unit of work context
///
/// Observations are immutable once stored; `id` is assigned by storage and
/// ignored on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: i64,
    pub session_id: String,
    pub project: String,
    #[serde(rename = "type")]
    pub obs_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub narrative: Option<String>,
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub files_read: Vec<String>,
    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(default)]
    pub prompt_number: Option<i64>,
    #[serde(default)]
    pub discovery_tokens: i64,
    pub created_at: String,
    pub created_at_epoch: i64,
}

/// Closing summary of a session's work
///
/// Storage permits several summaries per session; consumers order them by
/// recency rather than assuming uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: i64,
    pub session_id: String,
    pub project: String,
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub investigated: Option<String>,
    #[serde(default)]
    pub learned: Option<String>,
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub next_steps: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub prompt_number: Option<i64>,
    #[serde(default)]
    pub discovery_tokens: i64,
    pub created_at: String,
    pub created_at_epoch: i64,
}

fn non_empty(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

impl SessionSummary {
    /// True when any of the callout fields (investigated, learned, completed,
    /// next steps) carries text
    pub fn has_outcome(&self) -> bool {
        non_empty(&self.investigated)
            || non_empty(&self.learned)
            || non_empty(&self.completed)
            || non_empty(&self.next_steps)
    }
}
