#![allow(dead_code)]

use chrono::{DateTime, Utc};
use recollect_context::{ContextGenerator, ContextRequest};
use recollect_core::{Mode, RenderConfig};
use recollect_store::SqliteHistory;
use recollect_telemetry::{Observation, Paths, SessionSummary};
use std::path::PathBuf;
use tempfile::TempDir;

/// 2026-10-18 15:04 UTC
pub const NOW: i64 = 1_792_335_840_000;
pub const MINUTE: i64 = 60_000;

pub struct Workspace {
    pub temp: TempDir,
    pub paths: Paths,
    pub history: SqliteHistory,
    pub mode: Mode,
    pub cwd: PathBuf,
}

impl Workspace {
    pub fn new(project: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let paths = Paths::with_roots(temp.path().join("data"), temp.path().join("claude"));
        std::fs::create_dir_all(&paths.data_dir).unwrap();
        let history = SqliteHistory::open(&paths.database_file()).unwrap();
        let cwd = temp.path().join(project);
        Self {
            temp,
            paths,
            history,
            mode: Mode::code(),
            cwd,
        }
    }

    pub fn request(&self) -> ContextRequest {
        ContextRequest {
            cwd: Some(self.cwd.clone()),
            ..Default::default()
        }
    }

    pub fn generate(&self, config: &RenderConfig, request: &ContextRequest, terminal: bool) -> String {
        ContextGenerator::new(&self.history, &self.mode, config, &self.paths)
            .with_clock(DateTime::<Utc>::from_timestamp_millis(NOW).unwrap())
            .generate(request, terminal)
            .unwrap()
    }

    pub fn write_transcript(&self, session_id: &str, lines: &[String]) {
        let path = self.paths.transcript_file(&self.cwd, session_id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, lines.join("\n")).unwrap();
    }
}

pub fn observation(project: &str, obs_type: &str, title: &str, epoch: i64) -> Observation {
    Observation {
        session_id: "session-1".to_string(),
        project: project.to_string(),
        obs_type: obs_type.to_string(),
        title: Some(title.to_string()),
        concepts: vec!["problem-solution".to_string()],
        created_at: String::new(),
        created_at_epoch: epoch,
        ..Default::default()
    }
}

pub fn summary(project: &str, session_id: &str, epoch: i64) -> SessionSummary {
    SessionSummary {
        session_id: session_id.to_string(),
        project: project.to_string(),
        created_at: String::new(),
        created_at_epoch: epoch,
        ..Default::default()
    }
}

pub fn assistant_line(text: &str) -> String {
    serde_json::json!({
        "type": "assistant",
        "message": {"content": [{"type": "text", "text": text}]}
    })
    .to_string()
}

pub fn strip_ansi(text: &str) -> String {
    regex::Regex::new(r"\x1b\[[0-9;]*m")
        .unwrap()
        .replace_all(text, "")
        .to_string()
}
