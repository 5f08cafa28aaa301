use crate::document::{
    Block, CalloutLine, DayView, Document, EconomicsView, ObservationRow, Section, SummaryRow,
};
use recollect_core::LegendEntry;

pub(crate) const COLUMN_KEY_READ: &str = "Tokens to read this observation (cost to learn it now)";
pub(crate) const COLUMN_KEY_WORK: &str =
    "Tokens spent on work that produced this record ( research, building, deciding)";
pub(crate) const GUIDANCE_INDEX: &str =
    "This semantic index (titles, types, files, tokens) is usually sufficient to understand past work.";
pub(crate) const GUIDANCE_LEAD: &str =
    "When you need implementation details, rationale, or debugging context:";
pub(crate) const GUIDANCE_TIPS: [&str; 3] = [
    "Use MCP tools (search, get_observations) to fetch full observations on-demand",
    "Critical types ( bugfix, decision) often need detailed fetching",
    "Trust this index over re-reading code for past decisions and learnings",
];
pub(crate) const NO_HISTORY: &str = "No previous sessions found for this project yet.";

pub(crate) fn legend_text(entries: &[LegendEntry]) -> String {
    let pairs: Vec<String> = entries
        .iter()
        .map(|e| format!("{} {}", e.icon, e.type_id))
        .collect();
    format!("session-request | {}", pairs.join(" | "))
}

pub(crate) fn teaser_text(discovery_thousands: i64, read_tokens: usize) -> String {
    format!(
        "Access {}k tokens of past research & decisions for just {}t. Use MCP search tools to access memories by ID.",
        discovery_thousands,
        crate::format::thousands(read_tokens as i64)
    )
}

/// Presentation of each document node
///
/// Section order and grouping come from the [`Document`]; implementations
/// only choose glyphs, colors and whitespace.
pub trait Backend {
    fn no_history(&self, project: &str, timestamp: &str) -> String;
    fn header(&self, project: &str, timestamp: &str) -> Vec<String>;
    fn legend(&self, entries: &[LegendEntry]) -> Vec<String>;
    fn column_key(&self) -> Vec<String>;
    fn guidance(&self) -> Vec<String>;
    fn economics(&self, view: &EconomicsView) -> Vec<String>;
    fn date_header(&self, label: &str) -> Vec<String>;
    fn file_label(&self, file: &str) -> Vec<String>;
    /// Lines opening a run of compact rows
    fn table_header(&self) -> Vec<String>;
    fn compact_row(&self, row: &ObservationRow) -> String;
    fn expanded(&self, row: &ObservationRow, body: Option<&str>) -> Vec<String>;
    fn summary_row(&self, row: &SummaryRow) -> Vec<String>;
    fn last_summary(&self, lines: &[CalloutLine]) -> Vec<String>;
    fn previously(&self, message: &str) -> Vec<String>;
    fn teaser(&self, discovery_thousands: i64, read_tokens: usize) -> Vec<String>;

    fn day(&self, day: &DayView) -> Vec<String> {
        let mut lines = self.date_header(&day.label);
        for block in &day.blocks {
            match block {
                Block::Summary(row) => lines.extend(self.summary_row(row)),
                Block::File(file) => lines.extend(self.file_label(file)),
                Block::Table(rows) => {
                    lines.extend(self.table_header());
                    lines.extend(rows.iter().map(|r| self.compact_row(r)));
                    lines.push(String::new());
                }
                Block::Expanded { row, body } => lines.extend(self.expanded(row, body.as_deref())),
            }
        }
        lines
    }

    fn render(&self, document: &Document) -> String {
        let sections = match document {
            Document::NoHistory { project, timestamp } => {
                return self.no_history(project, timestamp);
            }
            Document::Context(sections) => sections,
        };

        let mut lines = Vec::new();
        for section in sections {
            let chunk = match section {
                Section::Header { project, timestamp } => self.header(project, timestamp),
                Section::Legend(entries) => self.legend(entries),
                Section::ColumnKey => self.column_key(),
                Section::Guidance => self.guidance(),
                Section::Economics(view) => self.economics(view),
                Section::Day(day) => self.day(day),
                Section::LastSummary(callout) => self.last_summary(callout),
                Section::Previously(message) => self.previously(message),
                Section::Teaser {
                    discovery_thousands,
                    read_tokens,
                } => self.teaser(*discovery_thousands, *read_tokens),
            };
            lines.extend(chunk);
        }
        lines.join("\n").trim_end().to_string()
    }
}
