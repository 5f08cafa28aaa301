//! Path resolution for memory data and session transcripts

use std::path::{Path, PathBuf};

/// Overrides the memory data directory
pub const DATA_DIR_ENV: &str = "RECOLLECT_DATA_DIR";
/// Overrides the Claude configuration directory
pub const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Resolves standard paths for settings, the history database and transcripts
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub home_claude: PathBuf,
}

impl Paths {
    /// Resolve from the environment, falling back to the home directory
    pub fn new() -> std::io::Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".recollect"));
        let home_claude = std::env::var_os(CLAUDE_CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".claude"));

        Ok(Self {
            data_dir,
            home_claude,
        })
    }

    /// Use explicit roots instead of the environment
    pub fn with_roots(data_dir: impl Into<PathBuf>, home_claude: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            home_claude: home_claude.into(),
        }
    }

    /// Get settings.json path
    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    /// Get history database path
    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join("recollect.db")
    }

    /// Get directory holding vocabulary mode files
    pub fn modes_dir(&self) -> PathBuf {
        self.data_dir.join("modes")
    }

    /// Get the Claude project directory for a working directory
    pub fn project_dir(&self, cwd: &Path) -> PathBuf {
        let slug = cwd.to_string_lossy().replace(['/', '.'], "-");
        self.home_claude.join("projects").join(slug)
    }

    /// Get the raw transcript of a session started in `cwd`
    pub fn transcript_file(&self, cwd: &Path, session_id: &str) -> PathBuf {
        self.project_dir(cwd).join(format!("{}.jsonl", session_id))
    }
}
