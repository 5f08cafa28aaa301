//! Observation type vocabularies ("modes")

use recollect_telemetry::Paths;
use serde::{Deserialize, Serialize};

/// Icon used for types the active vocabulary does not know
pub const DEFAULT_ICON: &str = "\u{1F4DD}";

/// Name of the built-in vocabulary
pub const DEFAULT_MODE: &str = "code";

/// One `icon type` pair of the header legend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub type_id: String,
    pub icon: String,
}

/// Maps observation types to display glyphs and labels
///
/// Generation logic never hardcodes a type list; everything goes through a
/// provider so vocabularies can be swapped per call.
pub trait VocabularyProvider {
    /// Icon for a type, `DEFAULT_ICON` when unknown
    fn icon_for(&self, obs_type: &str) -> &str;

    /// Emoji shown next to work-token counts
    fn work_emoji_for(&self, obs_type: &str) -> &str;

    /// Human label, the raw type id when unknown
    fn label_for<'a>(&'a self, obs_type: &'a str) -> &'a str;

    /// Legend entries in vocabulary order
    fn legend_entries(&self) -> Vec<LegendEntry>;

    fn is_valid_type(&self, obs_type: &str) -> bool;

    /// All concept tags of the vocabulary
    fn concept_ids(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub emoji: String,
    pub work_emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptEntry {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// A named vocabulary of observation types and concepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub observation_types: Vec<TypeEntry>,
    #[serde(default)]
    pub observation_concepts: Vec<ConceptEntry>,
}

fn type_entry(id: &str, label: &str, description: &str, emoji: &str, work_emoji: &str) -> TypeEntry {
    TypeEntry {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        emoji: emoji.to_string(),
        work_emoji: work_emoji.to_string(),
    }
}

fn concept_entry(id: &str, label: &str, description: &str) -> ConceptEntry {
    ConceptEntry {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
    }
}

impl Mode {
    /// Built-in software development vocabulary
    pub fn code() -> Self {
        const BUILD: &str = "\u{1F6E0}\u{FE0F}";
        const SCALES: &str = "\u{2696}\u{FE0F}";
        Self {
            name: "Code Development".to_string(),
            description: "Software development and engineering work".to_string(),
            observation_types: vec![
                type_entry("bugfix", "Bug Fix", "Something was broken, now fixed", "\u{1F534}", BUILD),
                type_entry("feature", "Feature", "New capability or functionality added", "\u{1F7E3}", BUILD),
                type_entry("refactor", "Refactor", "Code restructured, behavior unchanged", "\u{1F504}", BUILD),
                type_entry("change", "Change", "Generic modification (docs, config, misc)", "\u{2705}", BUILD),
                type_entry("discovery", "Discovery", "Learning about existing system", "\u{1F535}", "\u{1F50D}"),
                type_entry("decision", "Decision", "Architectural/design choice with rationale", SCALES, SCALES),
            ],
            observation_concepts: vec![
                concept_entry("how-it-works", "How It Works", "Understanding mechanisms"),
                concept_entry("why-it-exists", "Why It Exists", "Purpose or rationale"),
                concept_entry("what-changed", "What Changed", "Modifications made"),
                concept_entry("problem-solution", "Problem-Solution", "Issues and their fixes"),
                concept_entry("gotcha", "Gotcha", "Traps or edge cases"),
                concept_entry("pattern", "Pattern", "Reusable approach"),
                concept_entry("trade-off", "Trade-Off", "Pros/cons of a decision"),
            ],
        }
    }

    /// Load `modes/<name>.json`, falling back to the built-in vocabulary
    pub fn load(paths: &Paths, name: &str) -> Self {
        let path = paths.modes_dir().join(format!("{}.json", name));
        if !path.exists() {
            if name != DEFAULT_MODE {
                tracing::warn!("mode '{}' not found at {}, using built-in", name, path.display());
            }
            return Self::code();
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|c| serde_json::from_str::<Mode>(&c).map_err(|e| e.to_string()));
        match parsed {
            Ok(mode) if !mode.observation_types.is_empty() => mode,
            Ok(_) => {
                tracing::warn!("mode file {} defines no types, using built-in", path.display());
                Self::code()
            }
            Err(e) => {
                tracing::warn!("failed to load mode {}: {}", path.display(), e);
                Self::code()
            }
        }
    }

    fn entry(&self, obs_type: &str) -> Option<&TypeEntry> {
        self.observation_types.iter().find(|t| t.id == obs_type)
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::code()
    }
}

impl VocabularyProvider for Mode {
    fn icon_for(&self, obs_type: &str) -> &str {
        self.entry(obs_type).map_or(DEFAULT_ICON, |t| t.emoji.as_str())
    }

    fn work_emoji_for(&self, obs_type: &str) -> &str {
        self.entry(obs_type)
            .map_or(DEFAULT_ICON, |t| t.work_emoji.as_str())
    }

    fn label_for<'a>(&'a self, obs_type: &'a str) -> &'a str {
        self.entry(obs_type).map_or(obs_type, |t| t.label.as_str())
    }

    fn legend_entries(&self) -> Vec<LegendEntry> {
        self.observation_types
            .iter()
            .map(|t| LegendEntry {
                type_id: t.id.clone(),
                icon: t.emoji.clone(),
            })
            .collect()
    }

    fn is_valid_type(&self, obs_type: &str) -> bool {
        self.entry(obs_type).is_some()
    }

    fn concept_ids(&self) -> Vec<String> {
        self.observation_concepts.iter().map(|c| c.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mode_lookups() {
        let mode = Mode::code();
        assert_eq!(mode.icon_for("bugfix"), "\u{1F534}");
        assert_eq!(mode.work_emoji_for("discovery"), "\u{1F50D}");
        assert_eq!(mode.label_for("decision"), "Decision");
        assert!(mode.is_valid_type("refactor"));
    }

    #[test]
    fn test_unknown_type_degrades() {
        let mode = Mode::code();
        assert!(!mode.is_valid_type("poem"));
        assert_eq!(mode.icon_for("poem"), DEFAULT_ICON);
        assert_eq!(mode.work_emoji_for("poem"), DEFAULT_ICON);
        assert_eq!(mode.label_for("poem"), "poem");
    }

    #[test]
    fn test_legend_order() {
        let ids: Vec<String> = Mode::code()
            .legend_entries()
            .into_iter()
            .map(|e| e.type_id)
            .collect();
        assert_eq!(
            ids,
            vec!["bugfix", "feature", "refactor", "change", "discovery", "decision"]
        );
    }

    #[test]
    fn test_load_custom_mode() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = Paths::with_roots(temp.path(), temp.path().join(".claude"));
        std::fs::create_dir_all(paths.modes_dir()).unwrap();
        let custom = serde_json::json!({
            "name": "Research",
            "observation_types": [
                {"id": "source", "label": "Source", "emoji": "S", "work_emoji": "W"}
            ],
            "observation_concepts": [{"id": "citation", "label": "Citation"}]
        });
        std::fs::write(paths.modes_dir().join("research.json"), custom.to_string()).unwrap();

        let mode = Mode::load(&paths, "research");
        assert_eq!(mode.name, "Research");
        assert_eq!(mode.icon_for("source"), "S");
        assert!(!mode.is_valid_type("bugfix"));
        assert_eq!(mode.concept_ids(), vec!["citation"]);
    }

    #[test]
    fn test_load_falls_back_to_builtin() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = Paths::with_roots(temp.path(), temp.path().join(".claude"));
        std::fs::create_dir_all(paths.modes_dir()).unwrap();
        std::fs::write(paths.modes_dir().join("broken.json"), "{not json").unwrap();

        assert_eq!(Mode::load(&paths, "broken"), Mode::code());
        assert_eq!(Mode::load(&paths, "missing"), Mode::code());
    }
}
