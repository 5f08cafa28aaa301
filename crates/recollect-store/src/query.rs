//! Read-only history query interface

use crate::error::HistoryResult;
use recollect_telemetry::{Observation, SessionSummary};
use std::collections::BTreeSet;

/// Which projects a query covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    Single(String),
    /// Rows from every listed project, intermixed by recency
    Multi(Vec<String>),
}

impl ProjectScope {
    /// One project becomes `Single`, anything else `Multi`
    pub fn from_projects(projects: &[String]) -> Self {
        match projects {
            [only] => ProjectScope::Single(only.clone()),
            many => ProjectScope::Multi(many.to_vec()),
        }
    }

    pub fn projects(&self) -> &[String] {
        match self {
            ProjectScope::Single(project) => std::slice::from_ref(project),
            ProjectScope::Multi(projects) => projects,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, ProjectScope::Multi(_))
    }
}

/// Type and concept allow-lists; an observation needs both to match
#[derive(Debug, Clone, Copy)]
pub struct ObservationFilter<'a> {
    pub types: &'a BTreeSet<String>,
    pub concepts: &'a BTreeSet<String>,
    pub limit: usize,
}

/// Newest-first history reads, ties broken by id descending
///
/// `plan_path` restricts rows to sessions associated with that plan or with
/// no plan at all.
pub trait HistoryQuery {
    fn recent_observations(
        &self,
        scope: &ProjectScope,
        filter: ObservationFilter<'_>,
        plan_path: Option<&str>,
    ) -> HistoryResult<Vec<Observation>>;

    /// Summaries are never filtered by type or concept
    fn recent_summaries(
        &self,
        scope: &ProjectScope,
        limit: usize,
        plan_path: Option<&str>,
    ) -> HistoryResult<Vec<SessionSummary>>;
}
