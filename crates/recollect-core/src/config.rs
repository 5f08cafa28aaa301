//! Persisted settings and the per-call render configuration

use crate::vocabulary::{VocabularyProvider, DEFAULT_MODE};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

pub const DEFAULT_OBSERVATION_TYPES: &str = "bugfix,feature,refactor,discovery,decision,change";
pub const DEFAULT_OBSERVATION_CONCEPTS: &str =
    "how-it-works,why-it-exists,what-changed,problem-solution,gotcha,pattern,trade-off";

/// Counts accept numbers or numeric strings; anything else becomes 0
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let count = match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    Ok(count.max(0) as usize)
}

/// Booleans accept `true`/`false` or their string spellings
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Settings file contents (flat JSON object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: String,
    #[serde(deserialize_with = "lenient_count")]
    pub context_observations: usize,
    #[serde(deserialize_with = "lenient_count")]
    pub context_full_count: usize,
    pub context_full_field: String,
    #[serde(deserialize_with = "lenient_count")]
    pub context_session_count: usize,
    pub context_observation_types: String,
    pub context_observation_concepts: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub context_show_read_tokens: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub context_show_work_tokens: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub context_show_savings_amount: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub context_show_savings_percent: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub context_show_last_summary: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub context_show_last_message: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
            context_observations: 50,
            context_full_count: 10,
            context_full_field: "facts".to_string(),
            context_session_count: 10,
            context_observation_types: DEFAULT_OBSERVATION_TYPES.to_string(),
            context_observation_concepts: DEFAULT_OBSERVATION_CONCEPTS.to_string(),
            context_show_read_tokens: false,
            context_show_work_tokens: false,
            context_show_savings_amount: false,
            context_show_savings_percent: false,
            context_show_last_summary: true,
            context_show_last_message: true,
        }
    }
}

impl Settings {
    /// Load settings, creating the file with defaults when it is missing
    ///
    /// Unreadable or malformed files fall back to defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            let defaults = Self::default();
            match serde_json::to_string_pretty(&defaults) {
                Ok(json) => match recollect_telemetry::atomic_write(path, json.as_bytes()) {
                    Ok(()) => tracing::info!("created settings file with defaults: {}", path.display()),
                    Err(e) => tracing::warn!(
                        "failed to create settings file {}, using in-memory defaults: {}",
                        path.display(),
                        e
                    ),
                },
                Err(e) => tracing::warn!("failed to serialize default settings: {}", e),
            }
            return defaults;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("failed to read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("failed to parse settings {}, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Long-form field shown for expanded observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullField {
    Narrative,
    #[default]
    Facts,
}

impl FullField {
    /// Anything other than `narrative` selects facts
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("narrative") {
            FullField::Narrative
        } else {
            FullField::Facts
        }
    }
}

fn split_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Immutable configuration snapshot for one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub total_observation_count: usize,
    pub full_observation_count: usize,
    pub session_count: usize,
    pub observation_types: BTreeSet<String>,
    pub observation_concepts: BTreeSet<String>,
    pub show_read_tokens: bool,
    pub show_work_tokens: bool,
    pub show_savings_amount: bool,
    pub show_savings_percent: bool,
    pub full_observation_field: FullField,
    pub show_last_summary: bool,
    pub show_last_message: bool,
}

impl RenderConfig {
    /// Build from settings, restricted to what the vocabulary knows
    ///
    /// Unknown types are dropped. An empty type or concept list falls back to
    /// the vocabulary's complete list.
    pub fn resolve(settings: &Settings, vocabulary: &dyn VocabularyProvider) -> Self {
        let mut observation_types: BTreeSet<String> =
            split_list(&settings.context_observation_types)
                .into_iter()
                .filter(|t| vocabulary.is_valid_type(t))
                .collect();
        if observation_types.is_empty() {
            observation_types = vocabulary
                .legend_entries()
                .into_iter()
                .map(|e| e.type_id)
                .collect();
        }

        let mut observation_concepts = split_list(&settings.context_observation_concepts);
        if observation_concepts.is_empty() {
            observation_concepts = vocabulary.concept_ids().into_iter().collect();
        }

        Self {
            total_observation_count: settings.context_observations,
            full_observation_count: settings.context_full_count,
            session_count: settings.context_session_count,
            observation_types,
            observation_concepts,
            show_read_tokens: settings.context_show_read_tokens,
            show_work_tokens: settings.context_show_work_tokens,
            show_savings_amount: settings.context_show_savings_amount,
            show_savings_percent: settings.context_show_savings_percent,
            full_observation_field: FullField::parse(&settings.context_full_field),
            show_last_summary: settings.context_show_last_summary,
            show_last_message: settings.context_show_last_message,
        }
    }

    /// Whether any token column or economics line is shown
    pub fn any_token_display_enabled(&self) -> bool {
        self.show_read_tokens
            || self.show_work_tokens
            || self.show_savings_amount
            || self.show_savings_percent
    }

    /// Enable every token display toggle
    pub fn with_all_token_displays(mut self) -> Self {
        self.show_read_tokens = true;
        self.show_work_tokens = true;
        self.show_savings_amount = true;
        self.show_savings_percent = true;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::resolve(&Settings::default(), &crate::vocabulary::Mode::code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Mode;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.context_observations, 50);
        assert_eq!(settings.context_full_count, 10);
        assert_eq!(settings.context_session_count, 10);
        assert!(settings.context_show_last_summary);
        assert!(!settings.context_show_read_tokens);
    }

    #[test]
    fn test_settings_lenient_values() {
        let json = r#"{
            "context_observations": "25",
            "context_full_count": "lots",
            "context_session_count": -3,
            "context_show_read_tokens": "true",
            "context_show_last_message": "false",
            "unrelated_key": 1
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.context_observations, 25);
        assert_eq!(settings.context_full_count, 0);
        assert_eq!(settings.context_session_count, 0);
        assert!(settings.context_show_read_tokens);
        assert!(!settings.context_show_last_message);
        assert!(settings.context_show_last_summary, "absent keys keep defaults");
    }

    #[test]
    fn test_load_creates_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("data").join("settings.json");

        let settings = Settings::load(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists(), "defaults should be written to disk");

        let written: Settings =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, Settings::default());
    }

    #[test]
    fn test_load_malformed_file_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_resolve_filters_unknown_types() {
        let settings = Settings {
            context_observation_types: "bugfix, poem ,feature".to_string(),
            ..Default::default()
        };
        let config = RenderConfig::resolve(&settings, &Mode::code());
        let types: Vec<&str> = config.observation_types.iter().map(String::as_str).collect();
        assert_eq!(types, vec!["bugfix", "feature"]);
    }

    #[test]
    fn test_resolve_empty_lists_fall_back_to_vocabulary() {
        let settings = Settings {
            context_observation_types: " , ".to_string(),
            context_observation_concepts: String::new(),
            ..Default::default()
        };
        let config = RenderConfig::resolve(&settings, &Mode::code());
        assert_eq!(config.observation_types.len(), 6);
        assert!(config.observation_concepts.contains("gotcha"));
    }

    #[test]
    fn test_full_field_parse() {
        assert_eq!(FullField::parse("narrative"), FullField::Narrative);
        assert_eq!(FullField::parse("facts"), FullField::Facts);
        assert_eq!(FullField::parse("whatever"), FullField::Facts);
    }

    #[test]
    fn test_any_token_display_enabled() {
        let config = RenderConfig::default();
        assert!(!config.any_token_display_enabled());

        let config = RenderConfig {
            show_savings_percent: true,
            ..RenderConfig::default()
        };
        assert!(config.any_token_display_enabled());
    }
}
