use crate::cli::ContextArgs;
use recollect_context::{generate_context, ContextRequest};

impl From<ContextArgs> for ContextRequest {
    fn from(args: ContextArgs) -> Self {
        ContextRequest {
            cwd: args.cwd,
            projects: args.projects,
            session_id: args.session_id,
            plan_path: args.plan_path,
        }
    }
}

pub fn run(args: ContextArgs) -> anyhow::Result<()> {
    let terminal = args.terminal;
    let output = generate_context(&args.into(), terminal)?;
    println!("{}", output);
    Ok(())
}
