//! Project naming and git worktree awareness

use std::path::Path;

/// Fallback name for empty or root working directories
pub const UNKNOWN_PROJECT: &str = "unknown-project";

/// `X:\` or `X:` style drive root
fn drive_letter(cwd: &str) -> Option<char> {
    let mut chars = cwd.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    if chars.next() != Some(':') {
        return None;
    }
    match chars.as_str() {
        "" | "\\" | "/" => Some(letter.to_ascii_uppercase()),
        _ => None,
    }
}

/// Project name derived from the working directory's basename
pub fn project_name(cwd: &str) -> String {
    let trimmed = cwd.trim();
    if trimmed.is_empty() {
        tracing::warn!("empty cwd provided, using {}", UNKNOWN_PROJECT);
        return UNKNOWN_PROJECT.to_string();
    }

    if let Some(letter) = drive_letter(trimmed) {
        return format!("drive-{}", letter);
    }

    match Path::new(trimmed).file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => {
            tracing::warn!("root directory {} detected, using {}", trimmed, UNKNOWN_PROJECT);
            UNKNOWN_PROJECT.to_string()
        }
    }
}

/// Projects a working directory should see history for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub primary: String,
    /// Main checkout's project when `cwd` is a linked worktree
    pub parent: Option<String>,
    /// `[parent, primary]` inside a worktree, `[primary]` otherwise
    pub all_projects: Vec<String>,
}

impl ProjectContext {
    pub fn detect(cwd: &Path) -> Self {
        let primary = project_name(&cwd.to_string_lossy());
        match worktree_parent(cwd) {
            Some(parent) if parent != primary => Self {
                all_projects: vec![parent.clone(), primary.clone()],
                primary,
                parent: Some(parent),
            },
            _ => Self {
                all_projects: vec![primary.clone()],
                primary,
                parent: None,
            },
        }
    }

    pub fn is_worktree(&self) -> bool {
        self.parent.is_some()
    }
}

/// Parent project of a linked worktree
///
/// A worktree's `.git` is a file containing
/// `gitdir: <main>/.git/worktrees/<name>`.
fn worktree_parent(cwd: &Path) -> Option<String> {
    let git_path = cwd.join(".git");
    if !git_path.is_file() {
        return None;
    }

    let content = std::fs::read_to_string(&git_path)
        .map_err(|e| tracing::debug!("failed to read {}: {}", git_path.display(), e))
        .ok()?;
    let gitdir = content.lines().find_map(|l| l.trim().strip_prefix("gitdir:"))?.trim();

    let gitdir = gitdir.replace('\\', "/");
    let (main_git, _) = gitdir.split_once("/worktrees/")?;
    let main_root = main_git.strip_suffix("/.git")?;
    let name = project_name(main_root);
    (name != UNKNOWN_PROJECT).then_some(name)
}
