//! Token estimation and context economics

use crate::types::Observation;

/// Characters per token used for read-cost estimation
pub const CHARS_PER_TOKEN: usize = 4;

/// Round to nearest integer, halves toward positive infinity
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Length in UTF-16 code units
fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn text_len(field: &Option<String>) -> usize {
    field.as_deref().map_or(0, utf16_len)
}

/// Estimate how many tokens it costs to read an observation
///
/// Counts title, subtitle, narrative and the JSON-serialized facts list.
/// `discovery_tokens` never influences the estimate.
pub fn estimate_read_tokens(obs: &Observation) -> usize {
    let facts_len = serde_json::to_string(&obs.facts)
        .map(|json| utf16_len(&json))
        .unwrap_or(2);
    let chars =
        text_len(&obs.title) + text_len(&obs.subtitle) + text_len(&obs.narrative) + facts_len;
    chars.div_ceil(CHARS_PER_TOKEN)
}

/// Aggregate read-vs-work statistics over a batch of observations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenEconomics {
    pub total_observations: usize,
    pub total_read_tokens: usize,
    pub total_discovery_tokens: i64,
    /// Discovery minus read tokens; negative when reading costs more
    pub savings: i64,
    pub savings_percent: i64,
}

impl TokenEconomics {
    pub fn summarize(observations: &[Observation]) -> Self {
        let total_read_tokens: usize = observations.iter().map(estimate_read_tokens).sum();
        let total_discovery_tokens: i64 = observations.iter().map(|o| o.discovery_tokens).sum();
        let savings = total_discovery_tokens - total_read_tokens as i64;
        let savings_percent = if total_discovery_tokens > 0 {
            round_half_up(savings as f64 / total_discovery_tokens as f64 * 100.0)
        } else {
            0
        };

        Self {
            total_observations: observations.len(),
            total_read_tokens,
            total_discovery_tokens,
            savings,
            savings_percent,
        }
    }
}
