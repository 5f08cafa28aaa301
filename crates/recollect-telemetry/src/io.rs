//! Transcript reading and atomic file operations

use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
struct TranscriptLine {
    #[serde(rename = "type")]
    kind: String,
    message: Option<TranscriptMessage>,
}

#[derive(Debug, Deserialize)]
struct TranscriptMessage {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

fn system_reminder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<system-reminder>.*?</system-reminder>").expect("valid regex literal")
    })
}

/// Text of one assistant record, with system reminders removed
///
/// Returns `None` for lines that are not assistant records, do not parse,
/// or carry no visible text.
fn assistant_text(line: &str) -> Option<String> {
    let record: TranscriptLine = serde_json::from_str(line).ok()?;
    if record.kind != "assistant" {
        return None;
    }
    let text: String = record
        .message?
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    let cleaned = system_reminder().replace_all(&text, "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Extract the last assistant text message from a session transcript
///
/// Malformed and non-matching lines are skipped one by one; a missing or
/// unreadable file yields `None`.
pub fn last_assistant_message(path: &Path) -> Option<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("transcript {} unavailable: {}", path.display(), e);
            return None;
        }
    };

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .fold(None, |last, (index, line)| match assistant_text(line) {
            Some(text) => Some(text),
            None => {
                if serde_json::from_str::<serde_json::Value>(line).is_err() {
                    tracing::debug!("skipping malformed transcript line {}", index);
                }
                last
            }
        })
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant_line(text: &str) -> String {
        serde_json::json!({
            "type": "assistant",
            "message": {"content": [{"type": "text", "text": text}]}
        })
        .to_string()
    }

    #[test]
    fn test_last_assistant_message_picks_latest() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("session.jsonl");
        let user = r#"{"type":"user","message":{"content":"hello"}}"#;
        let lines = [
            assistant_line("first answer"),
            user.to_string(),
            assistant_line("second answer"),
            user.to_string(),
        ];
        std::fs::write(&path, lines.join("\n")).unwrap();

        assert_eq!(
            last_assistant_message(&path),
            Some("second answer".to_string())
        );
    }

    #[test]
    fn test_last_assistant_message_skips_malformed_lines() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("session.jsonl");
        let lines = [
            assistant_line("kept"),
            r#"{"type":"assistant","message":{"content":[{"type":"te"#.to_string(),
            "not json at all".to_string(),
        ];
        std::fs::write(&path, lines.join("\n")).unwrap();

        assert_eq!(last_assistant_message(&path), Some("kept".to_string()));
    }

    #[test]
    fn test_last_assistant_message_strips_system_reminders() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("session.jsonl");
        let lines = [
            assistant_line("real reply"),
            assistant_line("<system-reminder>\nignore me\n</system-reminder>  "),
            assistant_line("Done.<system-reminder>x</system-reminder>"),
        ];
        std::fs::write(&path, lines.join("\n")).unwrap();

        assert_eq!(last_assistant_message(&path), Some("Done.".to_string()));
    }

    #[test]
    fn test_last_assistant_message_joins_text_blocks() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("session.jsonl");
        let line = serde_json::json!({
            "type": "assistant",
            "message": {"content": [
                {"type": "text", "text": "Part one. "},
                {"type": "tool_use", "id": "t1", "name": "Read", "input": {"file_path": "a.rs"}},
                {"type": "text", "text": "Part two."}
            ]}
        });
        std::fs::write(&path, line.to_string()).unwrap();

        assert_eq!(
            last_assistant_message(&path),
            Some("Part one. Part two.".to_string())
        );
    }

    #[test]
    fn test_last_assistant_message_skips_untyped_blocks() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("session.jsonl");
        let line = serde_json::json!({
            "type": "assistant",
            "message": {"content": [
                {"text": "stray"},
                {"type": "text", "text": "real reply"}
            ]}
        });
        std::fs::write(&path, line.to_string()).unwrap();

        assert_eq!(last_assistant_message(&path), Some("real reply".to_string()));
    }

    #[test]
    fn test_last_assistant_message_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        assert_eq!(last_assistant_message(&temp.path().join("nope.jsonl")), None);
    }

    #[test]
    fn test_atomic_write() {
        let temp = tempfile::TempDir::new().unwrap();
        let test_file = temp.path().join("nested").join("test_atomic.txt");

        let data = b"Hello, world!";
        atomic_write(&test_file, data).unwrap();

        let read_data = std::fs::read(&test_file).unwrap();
        assert_eq!(data, read_data.as_slice());
    }
}
