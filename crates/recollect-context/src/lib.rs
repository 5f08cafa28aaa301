//! Recent-context generation for session start

mod generator;
mod project;

pub use generator::{ContextGenerator, ContextRequest};
pub use project::{project_name, ProjectContext, UNKNOWN_PROJECT};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use recollect_core::{Mode, RenderConfig, Settings};
use recollect_store::SqliteHistory;
use recollect_telemetry::Paths;

/// System IANA zone, UTC when it cannot be determined
pub fn system_timezone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => name.parse().unwrap_or_else(|_| {
            tracing::debug!("unknown timezone {}, using UTC", name);
            chrono_tz::UTC
        }),
        Err(e) => {
            tracing::debug!("failed to detect timezone, using UTC: {}", e);
            chrono_tz::UTC
        }
    }
}

/// Generate context using the on-disk settings, mode and history database
///
/// Without explicit projects the working directory's project is used, plus
/// the main checkout's project when inside a git worktree.
pub fn generate_context(request: &ContextRequest, terminal: bool) -> Result<String> {
    let paths = Paths::new().context("failed to resolve data directories")?;
    std::fs::create_dir_all(&paths.data_dir)
        .with_context(|| format!("failed to create {}", paths.data_dir.display()))?;

    let settings = Settings::load(&paths.settings_file());
    let mode = Mode::load(&paths, &settings.mode);
    let config = RenderConfig::resolve(&settings, &mode);
    let history = SqliteHistory::open(&paths.database_file())
        .with_context(|| format!("failed to open {}", paths.database_file().display()))?;

    let mut request = request.clone();
    if request.projects.is_empty() {
        let cwd = request.working_dir();
        request.projects = ProjectContext::detect(&cwd).all_projects;
        request.cwd = Some(cwd);
    }

    let output = ContextGenerator::new(&history, &mode, &config, &paths)
        .with_timezone(system_timezone())
        .generate(&request, terminal)?;
    Ok(output)
}
