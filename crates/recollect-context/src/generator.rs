use crate::project::project_name;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use recollect_core::{datetime, RenderConfig, VocabularyProvider};
use recollect_render::{render, ContextInput, DocumentBuilder};
use recollect_store::{HistoryQuery, HistoryResult, ObservationFilter, ProjectScope};
use recollect_telemetry::{last_assistant_message, Paths, SessionSummary};
use std::path::{Path, PathBuf};

/// One context generation request
#[derive(Debug, Clone, Default)]
pub struct ContextRequest {
    /// Defaults to the process working directory
    pub cwd: Option<PathBuf>,
    /// Defaults to the project named after `cwd`
    pub projects: Vec<String>,
    /// Acting session, excluded from the previous-message lookup
    pub session_id: Option<String>,
    /// Restrict history to sessions of this plan (or without a plan)
    pub plan_path: Option<String>,
}

impl ContextRequest {
    pub fn working_dir(&self) -> PathBuf {
        self.cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Read, assemble and render the recent-context block
///
/// Holds every collaborator explicitly so a call never consults global
/// state; tests inject their own history, vocabulary, clock and zone.
pub struct ContextGenerator<'a> {
    history: &'a dyn HistoryQuery,
    vocabulary: &'a dyn VocabularyProvider,
    config: &'a RenderConfig,
    paths: &'a Paths,
    tz: Tz,
    now: DateTime<Utc>,
}

impl<'a> ContextGenerator<'a> {
    pub fn new(
        history: &'a dyn HistoryQuery,
        vocabulary: &'a dyn VocabularyProvider,
        config: &'a RenderConfig,
        paths: &'a Paths,
    ) -> Self {
        Self {
            history,
            vocabulary,
            config,
            paths,
            tz: chrono_tz::UTC,
            now: Utc::now(),
        }
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Generate the context text; only storage failures are errors
    pub fn generate(&self, request: &ContextRequest, terminal: bool) -> HistoryResult<String> {
        let cwd = request.working_dir();
        let project = project_name(&cwd.to_string_lossy());
        let projects = if request.projects.is_empty() {
            vec![project.clone()]
        } else {
            request.projects.clone()
        };
        let scope = ProjectScope::from_projects(&projects);
        let plan_path = request.plan_path.as_deref();

        let filter = ObservationFilter {
            types: &self.config.observation_types,
            concepts: &self.config.observation_concepts,
            limit: self.config.total_observation_count,
        };
        let observations = self.history.recent_observations(&scope, filter, plan_path)?;
        let summaries = self.history.recent_summaries(
            &scope,
            self.config.session_count.saturating_add(1),
            plan_path,
        )?;
        tracing::debug!(
            "context for {:?}: {} observations, {} summaries",
            scope,
            observations.len(),
            summaries.len()
        );

        let previous_message = if self.config.show_last_message {
            self.previous_message(&summaries, request.session_id.as_deref(), &cwd)
        } else {
            None
        };

        let builder = DocumentBuilder::new(self.vocabulary, self.config, self.tz);
        let document = builder.build(&ContextInput {
            project: &project,
            timestamp: datetime::header_timestamp(self.now, &self.tz),
            cwd: &cwd,
            observations: &observations,
            summaries: &summaries,
            previous_message,
        });
        Ok(render(&document, terminal))
    }

    /// Last assistant message of the newest session other than the acting one
    fn previous_message(
        &self,
        summaries: &[SessionSummary],
        current_session: Option<&str>,
        cwd: &Path,
    ) -> Option<String> {
        let previous = summaries
            .iter()
            .find(|s| Some(s.session_id.as_str()) != current_session)?;
        let transcript = self.paths.transcript_file(cwd, &previous.session_id);
        let message = last_assistant_message(&transcript);
        if message.is_none() {
            tracing::debug!("no assistant message in {}", transcript.display());
        }
        message
    }
}
