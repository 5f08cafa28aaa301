//! Chronological merge of observations and session summaries

use crate::config::RenderConfig;
use crate::datetime;
use chrono::NaiveDate;
use chrono_tz::Tz;
use recollect_telemetry::{Observation, SessionSummary};
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};

/// File group label for observations that touched no files
pub const GENERAL_GROUP: &str = "General";

/// A kept summary plus the epoch it is displayed (and sorted) at
#[derive(Debug, Clone, Copy)]
pub struct SummarySpan<'a> {
    pub summary: &'a SessionSummary,
    pub display_epoch: i64,
}

/// One entry of the merged timeline
#[derive(Debug, Clone, Copy)]
pub enum TimelineRow<'a> {
    Observation(&'a Observation),
    Summary(SummarySpan<'a>),
}

impl TimelineRow<'_> {
    /// Sort key: creation time for observations, span boundary for summaries
    pub fn epoch(&self) -> i64 {
        match self {
            TimelineRow::Observation(obs) => obs.created_at_epoch,
            TimelineRow::Summary(span) => span.display_epoch,
        }
    }
}

/// An observation with its rendered time-of-day
#[derive(Debug, Clone)]
pub struct TimedObservation<'a> {
    pub observation: &'a Observation,
    pub time: String,
    /// Same time-of-day as the previous observation row
    pub repeated_time: bool,
}

/// Layout unit within one calendar day
#[derive(Debug, Clone)]
pub enum Segment<'a> {
    Summary(SummarySpan<'a>),
    /// File group label, emitted when the group differs from the previous row
    File(String),
    /// Run of consecutive compact rows
    Table(Vec<TimedObservation<'a>>),
    Expanded(TimedObservation<'a>),
}

#[derive(Debug, Clone)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub segments: Vec<Segment<'a>>,
}

/// Fully assembled timeline ready for rendering
#[derive(Debug, Clone)]
pub struct Timeline<'a> {
    pub days: Vec<DayGroup<'a>>,
    pub full_ids: HashSet<i64>,
}

impl Timeline<'_> {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Keep the first `session_count` summaries and compute their span boundaries
///
/// `summaries` is newest-first and holds one extra entry beyond the kept
/// ones. The newest summary is displayed at its own time; every other kept
/// summary at index `i` is displayed at the time of the summary at `i + 1`,
/// falling back to its own time when no such entry was fetched.
pub fn summary_spans(summaries: &[SessionSummary], session_count: usize) -> Vec<SummarySpan<'_>> {
    summaries
        .iter()
        .take(session_count)
        .enumerate()
        .map(|(i, summary)| {
            let boundary = if i == 0 { None } else { summaries.get(i + 1) };
            SummarySpan {
                summary,
                display_epoch: boundary.map_or(summary.created_at_epoch, |b| b.created_at_epoch),
            }
        })
        .collect()
}

/// Merge into one ascending sequence; equal epochs keep input order
pub fn merge_timeline<'a>(
    observations: &'a [Observation],
    spans: Vec<SummarySpan<'a>>,
) -> Vec<TimelineRow<'a>> {
    let mut rows: Vec<TimelineRow<'a>> = observations
        .iter()
        .map(TimelineRow::Observation)
        .chain(spans.into_iter().map(TimelineRow::Summary))
        .collect();
    rows.sort_by_key(TimelineRow::epoch);
    rows
}

/// IDs of the `full_count` most recent observations (newest-first input)
pub fn full_observation_ids(observations: &[Observation], full_count: usize) -> HashSet<i64> {
    observations.iter().take(full_count).map(|o| o.id).collect()
}

/// Path relative to `base`, walking up with `..` where needed
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix(base) {
        return stripped.to_path_buf();
    }

    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}

fn display_path(path: &str, cwd: &Path) -> String {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        relative_to(candidate, cwd).to_string_lossy().to_string()
    } else {
        path.to_string()
    }
}

/// File group of an observation: first modified file, else first read file
pub fn file_group(obs: &Observation, cwd: &Path) -> String {
    obs.files_modified
        .first()
        .or_else(|| obs.files_read.first())
        .map(|p| display_path(p, cwd))
        .unwrap_or_else(|| GENERAL_GROUP.to_string())
}

/// Lays out one day's rows into summaries, file tables and expanded blocks
struct DayLayout<'a> {
    segments: Vec<Segment<'a>>,
    current_file: Option<String>,
    last_time: String,
}

impl<'a> DayLayout<'a> {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            current_file: None,
            last_time: String::new(),
        }
    }

    fn push_summary(&mut self, span: SummarySpan<'a>) {
        // the ditto chain only breaks when a summary closes an open table
        if matches!(self.segments.last(), Some(Segment::Table(_))) {
            self.last_time.clear();
        }
        self.current_file = None;
        self.segments.push(Segment::Summary(span));
    }

    fn push_observation(&mut self, observation: &'a Observation, time: String, file: String, full: bool) {
        let repeated_time = time == self.last_time;
        self.last_time = time.clone();
        let row = TimedObservation {
            observation,
            time,
            repeated_time,
        };

        if self.current_file.as_deref() != Some(file.as_str()) {
            self.segments.push(Segment::File(file.clone()));
            self.current_file = Some(file);
        }

        if full {
            self.segments.push(Segment::Expanded(row));
        } else if let Some(Segment::Table(rows)) = self.segments.last_mut() {
            rows.push(row);
        } else {
            self.segments.push(Segment::Table(vec![row]));
        }
    }
}

/// Run the whole assembly: spans, merge, full set, day and file grouping
pub fn assemble<'a>(
    observations: &'a [Observation],
    summaries: &'a [SessionSummary],
    config: &RenderConfig,
    cwd: &Path,
    tz: &Tz,
) -> Timeline<'a> {
    let spans = summary_spans(summaries, config.session_count);
    let rows = merge_timeline(observations, spans);
    let full_ids = full_observation_ids(observations, config.full_observation_count);

    let mut by_date: BTreeMap<NaiveDate, Vec<TimelineRow<'a>>> = BTreeMap::new();
    for row in rows {
        by_date
            .entry(datetime::local_date(row.epoch(), tz))
            .or_default()
            .push(row);
    }

    let days = by_date
        .into_iter()
        .map(|(date, rows)| {
            let mut layout = DayLayout::new();
            for row in rows {
                match row {
                    TimelineRow::Summary(span) => layout.push_summary(span),
                    TimelineRow::Observation(obs) => layout.push_observation(
                        obs,
                        datetime::time_of_day(obs.created_at_epoch, tz),
                        file_group(obs, cwd),
                        full_ids.contains(&obs.id),
                    ),
                }
            }
            DayGroup {
                date,
                segments: layout.segments,
            }
        })
        .collect();

    Timeline { days, full_ids }
}
