//! Plain markdown output

use crate::backend::{
    legend_text, teaser_text, Backend, COLUMN_KEY_READ, COLUMN_KEY_WORK, GUIDANCE_INDEX,
    GUIDANCE_LEAD, GUIDANCE_TIPS, NO_HISTORY,
};
use crate::document::{CalloutLine, EconomicsView, ObservationRow, Savings, SummaryRow};
use crate::format::thousands;
use recollect_core::LegendEntry;

/// Ditto mark for a time equal to the previous row's
const DITTO: &str = "\"";

pub struct Markdown;

fn time_cell(row: &ObservationRow) -> &str {
    if row.repeated_time {
        DITTO
    } else {
        &row.time
    }
}

fn read_cell(row: &ObservationRow) -> String {
    row.read_tokens.map_or_else(String::new, |t| format!("~{}", t))
}

fn work_cell(row: &ObservationRow) -> String {
    match &row.work {
        Some(work) if work.tokens > 0 => format!("{} {}", work.emoji, thousands(work.tokens)),
        Some(_) => "-".to_string(),
        None => String::new(),
    }
}

pub(crate) fn savings_text(savings: &Savings) -> String {
    match savings {
        Savings::Both { amount, percent } => format!(
            "{} tokens ({}% reduction from reuse)",
            thousands(*amount),
            percent
        ),
        Savings::Amount(amount) => format!("{} tokens", thousands(*amount)),
        Savings::Percent(percent) => format!("{}% reduction from reuse", percent),
    }
}

impl Backend for Markdown {
    fn no_history(&self, project: &str, timestamp: &str) -> String {
        format!("# [{}] recent context, {}\n\n{}", project, timestamp, NO_HISTORY)
    }

    fn header(&self, project: &str, timestamp: &str) -> Vec<String> {
        vec![
            format!("# [{}] recent context, {}", project, timestamp),
            String::new(),
        ]
    }

    fn legend(&self, entries: &[LegendEntry]) -> Vec<String> {
        vec![format!("**Legend:** {}", legend_text(entries)), String::new()]
    }

    fn column_key(&self) -> Vec<String> {
        vec![
            "**Column Key**:".to_string(),
            format!("- **Read**: {}", COLUMN_KEY_READ),
            format!("- **Work**: {}", COLUMN_KEY_WORK),
            String::new(),
        ]
    }

    fn guidance(&self) -> Vec<String> {
        let mut lines = vec![
            format!("**Context Index:** {}", GUIDANCE_INDEX),
            String::new(),
            GUIDANCE_LEAD.to_string(),
        ];
        lines.extend(GUIDANCE_TIPS.iter().map(|tip| format!("- {}", tip)));
        lines.push(String::new());
        lines
    }

    fn economics(&self, view: &EconomicsView) -> Vec<String> {
        let mut lines = vec![
            "**Context Economics**:".to_string(),
            format!(
                "- Loading: {} observations ({} tokens to read)",
                view.total_observations,
                thousands(view.total_read_tokens as i64)
            ),
            format!(
                "- Work investment: {} tokens spent on research, building, and decisions",
                thousands(view.total_discovery_tokens)
            ),
        ];
        if let Some(savings) = &view.savings {
            lines.push(format!("- Your savings: {}", savings_text(savings)));
        }
        lines.push(String::new());
        lines
    }

    fn date_header(&self, label: &str) -> Vec<String> {
        vec![format!("### {}", label), String::new()]
    }

    fn file_label(&self, file: &str) -> Vec<String> {
        vec![format!("**{}**", file)]
    }

    fn table_header(&self) -> Vec<String> {
        vec![
            "| ID | Time | T | Title | Read | Work |".to_string(),
            "|----|------|---|-------|------|------|".to_string(),
        ]
    }

    fn compact_row(&self, row: &ObservationRow) -> String {
        format!(
            "| #{} | {} | {} | {} | {} | {} |",
            row.id,
            time_cell(row),
            row.icon,
            row.title,
            read_cell(row),
            work_cell(row)
        )
    }

    fn expanded(&self, row: &ObservationRow, body: Option<&str>) -> Vec<String> {
        let mut lines = vec![format!(
            "**#{}** {} {} **{}**",
            row.id,
            time_cell(row),
            row.icon,
            row.title
        )];
        if let Some(body) = body {
            lines.extend([String::new(), body.to_string(), String::new()]);
        }

        let mut tokens = Vec::new();
        if let Some(read) = row.read_tokens {
            tokens.push(format!("Read: ~{}", read));
        }
        if row.work.is_some() {
            tokens.push(format!("Work: {}", work_cell(row)));
        }
        if !tokens.is_empty() {
            lines.push(tokens.join(", "));
        }
        lines.push(String::new());
        lines
    }

    fn summary_row(&self, row: &SummaryRow) -> Vec<String> {
        vec![
            format!("**#S{}** {} ({})", row.id, row.request, row.time),
            String::new(),
        ]
    }

    fn last_summary(&self, lines: &[CalloutLine]) -> Vec<String> {
        lines
            .iter()
            .flat_map(|line| [format!("**{}**: {}", line.label.as_str(), line.text), String::new()])
            .collect()
    }

    fn previously(&self, message: &str) -> Vec<String> {
        vec![
            String::new(),
            "---".to_string(),
            String::new(),
            "**Previously**".to_string(),
            String::new(),
            format!("A: {}", message),
            String::new(),
        ]
    }

    fn teaser(&self, discovery_thousands: i64, read_tokens: usize) -> Vec<String> {
        vec![String::new(), teaser_text(discovery_thousands, read_tokens)]
    }
}
