use recollect_context::{generate_context, ContextRequest};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::path::PathBuf;

/// Set to `1` or `true` to start a session without injected context
pub const NO_CONTEXT_ENV: &str = "RECOLLECT_NO_CONTEXT";

const SESSION_START_EVENT: &str = "SessionStart";

#[derive(Debug, Default, Deserialize)]
struct SessionStartInput {
    #[serde(default)]
    cwd: Option<PathBuf>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HookSpecificOutput {
    hook_event_name: &'static str,
    additional_context: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HookOutput {
    hook_specific_output: HookSpecificOutput,
}

impl HookOutput {
    fn session_start(additional_context: String) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: SESSION_START_EVENT,
                additional_context,
            },
        }
    }
}

fn context_disabled() -> bool {
    matches!(
        std::env::var(NO_CONTEXT_ENV).as_deref(),
        Ok("1") | Ok("true")
    )
}

fn session_start_output(input_str: &str) -> anyhow::Result<HookOutput> {
    if context_disabled() {
        tracing::info!("{} set, skipping context", NO_CONTEXT_ENV);
        return Ok(HookOutput::session_start(String::new()));
    }

    let input: SessionStartInput = if input_str.trim().is_empty() {
        SessionStartInput::default()
    } else {
        serde_json::from_str(input_str)?
    };

    let request = ContextRequest {
        cwd: input.cwd,
        session_id: input.session_id,
        ..Default::default()
    };
    let context = generate_context(&request, false)?;
    Ok(HookOutput::session_start(context.trim().to_string()))
}

pub fn hook_session_start() -> anyhow::Result<()> {
    let mut input_str = String::new();
    io::stdin().read_to_string(&mut input_str)?;

    let output = session_start_output(&input_str)?;
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
