//! Structured context document
//!
//! Building the document decides *what* is shown: which sections exist,
//! their order, grouping boundaries and every cell value. Backends only
//! decide how each node looks, so plain and terminal output cannot drift
//! apart structurally.

use chrono_tz::Tz;
use recollect_core::{
    assemble, datetime, FullField, LegendEntry, RenderConfig, Segment, SummarySpan,
    TimedObservation, VocabularyProvider,
};
use recollect_telemetry::{
    estimate_read_tokens, round_half_up, Observation, SessionSummary, TokenEconomics,
};
use std::path::Path;

/// Rendered context, either the empty-history notice or ordered sections
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    NoHistory { project: String, timestamp: String },
    Context(Vec<Section>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Header { project: String, timestamp: String },
    Legend(Vec<LegendEntry>),
    ColumnKey,
    Guidance,
    Economics(EconomicsView),
    Day(DayView),
    LastSummary(Vec<CalloutLine>),
    Previously(String),
    Teaser { discovery_thousands: i64, read_tokens: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Savings {
    Both { amount: i64, percent: i64 },
    Amount(i64),
    Percent(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomicsView {
    pub total_observations: usize,
    pub total_read_tokens: usize,
    pub total_discovery_tokens: i64,
    pub savings: Option<Savings>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayView {
    pub label: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Summary(SummaryRow),
    File(String),
    Table(Vec<ObservationRow>),
    Expanded { row: ObservationRow, body: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub id: i64,
    pub request: String,
    pub time: String,
}

/// Work-token cell; `tokens` may be zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkTokens {
    pub emoji: String,
    pub tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRow {
    pub id: i64,
    pub time: String,
    pub repeated_time: bool,
    pub icon: String,
    pub title: String,
    /// Present when read tokens are displayed
    pub read_tokens: Option<usize>,
    /// Present when work tokens are displayed
    pub work: Option<WorkTokens>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutLabel {
    Investigated,
    Learned,
    Completed,
    NextSteps,
}

impl CalloutLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalloutLabel::Investigated => "Investigated",
            CalloutLabel::Learned => "Learned",
            CalloutLabel::Completed => "Completed",
            CalloutLabel::NextSteps => "Next Steps",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutLine {
    pub label: CalloutLabel,
    pub text: String,
}

/// Query results plus the ambient values one document is built from
pub struct ContextInput<'a> {
    pub project: &'a str,
    pub timestamp: String,
    pub cwd: &'a Path,
    /// Newest-first
    pub observations: &'a [Observation],
    /// Newest-first, including the extra boundary summary
    pub summaries: &'a [SessionSummary],
    pub previous_message: Option<String>,
}

/// Turns query results into a [`Document`]
pub struct DocumentBuilder<'a> {
    vocabulary: &'a dyn VocabularyProvider,
    config: &'a RenderConfig,
    tz: Tz,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(String::from)
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(vocabulary: &'a dyn VocabularyProvider, config: &'a RenderConfig, tz: Tz) -> Self {
        Self {
            vocabulary,
            config,
            tz,
        }
    }

    pub fn build(&self, input: &ContextInput<'_>) -> Document {
        if input.observations.is_empty() && input.summaries.is_empty() {
            return Document::NoHistory {
                project: input.project.to_string(),
                timestamp: input.timestamp.clone(),
            };
        }

        let economics = TokenEconomics::summarize(input.observations);
        let token_display = self.config.any_token_display_enabled();

        let mut sections = vec![
            Section::Header {
                project: input.project.to_string(),
                timestamp: input.timestamp.clone(),
            },
            Section::Legend(self.vocabulary.legend_entries()),
        ];
        if token_display {
            sections.push(Section::ColumnKey);
        }
        sections.push(Section::Guidance);
        if token_display {
            sections.push(Section::Economics(self.economics(&economics)));
        }

        let timeline = assemble(
            input.observations,
            input.summaries,
            self.config,
            input.cwd,
            &self.tz,
        );
        sections.extend(timeline.days.iter().map(|day| {
            Section::Day(DayView {
                label: datetime::date_label(day.date),
                blocks: day.segments.iter().map(|s| self.block(s)).collect(),
            })
        }));

        if let Some(callout) = self.last_summary(input.summaries, input.observations) {
            sections.push(Section::LastSummary(callout));
        }

        if self.config.show_last_message {
            if let Some(message) = input.previous_message.as_deref().and_then(|m| non_empty(Some(m))) {
                sections.push(Section::Previously(message));
            }
        }

        if token_display && economics.total_discovery_tokens > 0 && economics.savings > 0 {
            sections.push(Section::Teaser {
                discovery_thousands: round_half_up(economics.total_discovery_tokens as f64 / 1000.0),
                read_tokens: economics.total_read_tokens,
            });
        }

        Document::Context(sections)
    }

    fn economics(&self, economics: &TokenEconomics) -> EconomicsView {
        let savings = if economics.total_discovery_tokens > 0 {
            match (self.config.show_savings_amount, self.config.show_savings_percent) {
                (true, true) => Some(Savings::Both {
                    amount: economics.savings,
                    percent: economics.savings_percent,
                }),
                (true, false) => Some(Savings::Amount(economics.savings)),
                (false, true) => Some(Savings::Percent(economics.savings_percent)),
                (false, false) => None,
            }
        } else {
            None
        };

        EconomicsView {
            total_observations: economics.total_observations,
            total_read_tokens: economics.total_read_tokens,
            total_discovery_tokens: economics.total_discovery_tokens,
            savings,
        }
    }

    fn block(&self, segment: &Segment<'_>) -> Block {
        match segment {
            Segment::Summary(span) => Block::Summary(self.summary_row(span)),
            Segment::File(file) => Block::File(file.clone()),
            Segment::Table(rows) => {
                Block::Table(rows.iter().map(|r| self.observation_row(r)).collect())
            }
            Segment::Expanded(timed) => Block::Expanded {
                row: self.observation_row(timed),
                body: self.body(timed.observation),
            },
        }
    }

    fn summary_row(&self, span: &SummarySpan<'_>) -> SummaryRow {
        SummaryRow {
            id: span.summary.id,
            request: non_empty(span.summary.request.as_deref())
                .unwrap_or_else(|| "Session started".to_string()),
            time: datetime::date_time(span.display_epoch, &self.tz),
        }
    }

    fn observation_row(&self, timed: &TimedObservation<'_>) -> ObservationRow {
        let obs = timed.observation;
        ObservationRow {
            id: obs.id,
            time: timed.time.clone(),
            repeated_time: timed.repeated_time,
            icon: self.vocabulary.icon_for(&obs.obs_type).to_string(),
            title: non_empty(obs.title.as_deref()).unwrap_or_else(|| "Untitled".to_string()),
            read_tokens: self
                .config
                .show_read_tokens
                .then(|| estimate_read_tokens(obs)),
            work: self.config.show_work_tokens.then(|| WorkTokens {
                emoji: self.vocabulary.work_emoji_for(&obs.obs_type).to_string(),
                tokens: obs.discovery_tokens,
            }),
        }
    }

    fn body(&self, obs: &Observation) -> Option<String> {
        match self.config.full_observation_field {
            FullField::Narrative => non_empty(obs.narrative.as_deref()),
            FullField::Facts => non_empty(Some(obs.facts.join("\n").as_str())),
        }
    }

    /// Callout for the newest summary when it is content-bearing and newer
    /// than every observation
    fn last_summary(
        &self,
        summaries: &[SessionSummary],
        observations: &[Observation],
    ) -> Option<Vec<CalloutLine>> {
        let summary = summaries.first()?;
        if !self.config.show_last_summary || !summary.has_outcome() {
            return None;
        }
        if let Some(newest) = observations.first() {
            if summary.created_at_epoch <= newest.created_at_epoch {
                return None;
            }
        }

        let fields = [
            (CalloutLabel::Investigated, &summary.investigated),
            (CalloutLabel::Learned, &summary.learned),
            (CalloutLabel::Completed, &summary.completed),
            (CalloutLabel::NextSteps, &summary.next_steps),
        ];
        Some(
            fields
                .into_iter()
                .filter_map(|(label, text)| {
                    non_empty(text.as_deref()).map(|text| CalloutLine { label, text })
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recollect_core::Mode;

    const MINUTE: i64 = 60_000;
    // 2026-10-18 09:00 UTC
    const BASE: i64 = 1_792_314_000_000;

    fn obs(id: i64, epoch: i64) -> Observation {
        Observation {
            id,
            session_id: "s1".to_string(),
            project: "demo".to_string(),
            obs_type: "bugfix".to_string(),
            title: Some(format!("obs {}", id)),
            facts: vec!["one".to_string(), "two".to_string()],
            discovery_tokens: 2000,
            created_at_epoch: epoch,
            ..Default::default()
        }
    }

    fn summary(id: i64, session: &str, epoch: i64) -> SessionSummary {
        SessionSummary {
            id,
            session_id: session.to_string(),
            project: "demo".to_string(),
            created_at_epoch: epoch,
            ..Default::default()
        }
    }

    fn build(
        config: &RenderConfig,
        observations: &[Observation],
        summaries: &[SessionSummary],
        previous: Option<&str>,
    ) -> Document {
        let mode = Mode::code();
        let builder = DocumentBuilder::new(&mode, config, chrono_tz::UTC);
        builder.build(&ContextInput {
            project: "demo",
            timestamp: "2026-10-18 9:00am UTC".to_string(),
            cwd: Path::new("/work/demo"),
            observations,
            summaries,
            previous_message: previous.map(String::from),
        })
    }

    fn sections(doc: Document) -> Vec<Section> {
        match doc {
            Document::Context(sections) => sections,
            other => panic!("expected sections, got {:?}", other),
        }
    }

    fn kinds(sections: &[Section]) -> Vec<&'static str> {
        sections
            .iter()
            .map(|s| match s {
                Section::Header { .. } => "header",
                Section::Legend(_) => "legend",
                Section::ColumnKey => "column-key",
                Section::Guidance => "guidance",
                Section::Economics(_) => "economics",
                Section::Day(_) => "day",
                Section::LastSummary(_) => "last-summary",
                Section::Previously(_) => "previously",
                Section::Teaser { .. } => "teaser",
            })
            .collect()
    }

    #[test]
    fn test_no_history() {
        let doc = build(&RenderConfig::default(), &[], &[], Some("ignored"));
        assert_eq!(
            doc,
            Document::NoHistory {
                project: "demo".to_string(),
                timestamp: "2026-10-18 9:00am UTC".to_string(),
            }
        );
    }

    #[test]
    fn test_token_sections_hidden_by_default() {
        let doc = build(&RenderConfig::default(), &[obs(1, BASE)], &[], None);
        assert_eq!(kinds(&sections(doc)), vec!["header", "legend", "guidance", "day"]);
    }

    #[test]
    fn test_full_section_order() {
        let config = RenderConfig::default().with_all_token_displays();
        let mut newest = summary(9, "s0", BASE + MINUTE);
        newest.learned = Some("lock order matters".to_string());
        let doc = build(&config, &[obs(1, BASE)], &[newest], Some("Done."));

        assert_eq!(
            kinds(&sections(doc)),
            vec![
                "header",
                "legend",
                "column-key",
                "guidance",
                "economics",
                "day",
                "last-summary",
                "previously",
                "teaser"
            ]
        );
    }

    #[test]
    fn test_economics_savings_variants() {
        let observations = [obs(1, BASE)];
        let read = estimate_read_tokens(&observations[0]);
        let economics = |amount: bool, percent: bool| {
            let config = RenderConfig {
                show_read_tokens: true,
                show_savings_amount: amount,
                show_savings_percent: percent,
                ..RenderConfig::default()
            };
            sections(build(&config, &observations, &[], None))
                .into_iter()
                .find_map(|s| match s {
                    Section::Economics(view) => Some(view),
                    _ => None,
                })
                .unwrap()
        };

        let savings = 2000 - read as i64;
        let percent = round_half_up(savings as f64 / 2000.0 * 100.0);
        assert_eq!(economics(true, true).savings, Some(Savings::Both { amount: savings, percent }));
        assert_eq!(economics(true, false).savings, Some(Savings::Amount(savings)));
        assert_eq!(economics(false, true).savings, Some(Savings::Percent(percent)));
        assert_eq!(economics(false, false).savings, None);
    }

    #[test]
    fn test_last_summary_requires_newer_content() {
        let config = RenderConfig::default();
        let mut newest = summary(2, "s1", BASE + 2 * MINUTE);
        newest.completed = Some("shipped".to_string());
        newest.next_steps = Some("".to_string());
        let mut older = summary(1, "s1", BASE);
        older.learned = Some("older learning".to_string());

        let doc = sections(build(&config, &[obs(1, BASE + MINUTE)], &[newest.clone(), older.clone()], None));
        let callout = doc.iter().find_map(|s| match s {
            Section::LastSummary(lines) => Some(lines.clone()),
            _ => None,
        });
        assert_eq!(
            callout,
            Some(vec![CalloutLine {
                label: CalloutLabel::Completed,
                text: "shipped".to_string()
            }])
        );

        // an observation newer than the summary suppresses the callout
        let doc = sections(build(&config, &[obs(1, BASE + 3 * MINUTE)], &[newest, older], None));
        assert!(!kinds(&doc).contains(&"last-summary"));
    }

    #[test]
    fn test_expanded_body_field() {
        let mut o = obs(1, BASE);
        o.narrative = Some("the long story".to_string());
        let body_for = |field: FullField| {
            let config = RenderConfig {
                full_observation_count: 1,
                full_observation_field: field,
                ..RenderConfig::default()
            };
            let doc = sections(build(&config, std::slice::from_ref(&o), &[], None));
            doc.into_iter()
                .find_map(|s| match s {
                    Section::Day(day) => day.blocks.into_iter().find_map(|b| match b {
                        Block::Expanded { body, .. } => Some(body),
                        _ => None,
                    }),
                    _ => None,
                })
                .unwrap()
        };

        assert_eq!(body_for(FullField::Facts), Some("one\ntwo".to_string()));
        assert_eq!(body_for(FullField::Narrative), Some("the long story".to_string()));
    }

    #[test]
    fn test_row_cells_follow_toggles() {
        let mut untitled = obs(1, BASE);
        untitled.title = None;
        untitled.discovery_tokens = 0;
        let config = RenderConfig {
            show_work_tokens: true,
            full_observation_count: 0,
            ..RenderConfig::default()
        };
        let doc = sections(build(&config, &[untitled], &[summary(4, "s1", BASE - MINUTE)], None));

        let day = doc
            .into_iter()
            .find_map(|s| match s {
                Section::Day(day) => Some(day),
                _ => None,
            })
            .unwrap();
        assert_eq!(day.label, "Oct 18, 2026");
        assert_eq!(
            day.blocks[0],
            Block::Summary(SummaryRow {
                id: 4,
                request: "Session started".to_string(),
                time: "Oct 18, 8:59 AM".to_string(),
            })
        );
        assert_eq!(day.blocks[1], Block::File("General".to_string()));
        match &day.blocks[2] {
            Block::Table(rows) => {
                assert_eq!(rows[0].title, "Untitled");
                assert_eq!(rows[0].read_tokens, None);
                assert_eq!(
                    rows[0].work,
                    Some(WorkTokens {
                        emoji: "\u{1F6E0}\u{FE0F}".to_string(),
                        tokens: 0
                    })
                );
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_teaser_needs_positive_savings() {
        let config = RenderConfig::default().with_all_token_displays();
        let mut cheap = obs(1, BASE);
        cheap.discovery_tokens = 1;
        let doc = sections(build(&config, &[cheap], &[], None));
        assert!(!kinds(&doc).contains(&"teaser"));

        let doc = sections(build(&config, &[obs(1, BASE)], &[], None));
        assert!(doc.contains(&Section::Teaser {
            discovery_thousands: 2,
            read_tokens: estimate_read_tokens(&obs(1, BASE)),
        }));
    }

    #[test]
    fn test_previous_message_toggle() {
        let config = RenderConfig {
            show_last_message: false,
            ..RenderConfig::default()
        };
        let doc = sections(build(&config, &[obs(1, BASE)], &[], Some("hello")));
        assert!(!kinds(&doc).contains(&"previously"));

        let doc = sections(build(&RenderConfig::default(), &[obs(1, BASE)], &[], Some("")));
        assert!(!kinds(&doc).contains(&"previously"));
    }
}
