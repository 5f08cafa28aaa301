use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recollect")]
#[command(version)]
#[command(about = "Recent-context injection for AI coding sessions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the recent-context block for a project
    Context(ContextArgs),

    /// Hook: Session start context injection (stdin/stdout JSON)
    #[command(name = "hook:session-start")]
    HookSessionStart,

    /// Print version information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct ContextArgs {
    /// Render with ANSI colors instead of markdown
    #[arg(long)]
    pub terminal: bool,

    /// Working directory (defaults to the current directory)
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Project to include; repeat for a merged multi-project timeline
    #[arg(long = "project")]
    pub projects: Vec<String>,

    /// Current session, skipped when looking up the previous message
    #[arg(long)]
    pub session_id: Option<String>,

    /// Only include sessions tied to this plan file (or to no plan)
    #[arg(long = "plan")]
    pub plan_path: Option<String>,
}
