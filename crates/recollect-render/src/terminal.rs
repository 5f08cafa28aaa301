//! ANSI-colored terminal output

use crate::backend::{
    legend_text, teaser_text, Backend, COLUMN_KEY_READ, COLUMN_KEY_WORK, GUIDANCE_INDEX,
    GUIDANCE_LEAD, GUIDANCE_TIPS, NO_HISTORY,
};
use crate::document::{CalloutLabel, CalloutLine, EconomicsView, ObservationRow, SummaryRow};
use crate::format::thousands;
use crate::markdown::savings_text;
use recollect_core::LegendEntry;

pub const RESET: &str = "\x1b[0m";
pub const BRIGHT: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const CYAN: &str = "\x1b[36m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const GRAY: &str = "\x1b[90m";

const RULE_WIDTH: usize = 60;

pub struct Terminal;

fn rule() -> String {
    format!("{}{}{}", GRAY, "\u{2500}".repeat(RULE_WIDTH), RESET)
}

fn dim(text: &str) -> String {
    format!("{}{}{}", DIM, text, RESET)
}

/// Repeated times stay visible but recede
fn time_cell(row: &ObservationRow) -> String {
    let color = if row.repeated_time { GRAY } else { DIM };
    format!("{}{}{}", color, row.time, RESET)
}

fn read_cell(row: &ObservationRow) -> String {
    match row.read_tokens {
        Some(tokens) if tokens > 0 => dim(&format!("(~{}t)", tokens)),
        _ => String::new(),
    }
}

fn work_cell(row: &ObservationRow) -> String {
    match &row.work {
        Some(work) if work.tokens > 0 => {
            dim(&format!("({} {}t)", work.emoji, thousands(work.tokens)))
        }
        _ => String::new(),
    }
}

fn callout_color(label: CalloutLabel) -> &'static str {
    match label {
        CalloutLabel::Investigated => BLUE,
        CalloutLabel::Learned => YELLOW,
        CalloutLabel::Completed => GREEN,
        CalloutLabel::NextSteps => MAGENTA,
    }
}

impl Backend for Terminal {
    fn no_history(&self, project: &str, timestamp: &str) -> String {
        format!(
            "\n{}{}[{}] recent context, {}{}\n{}\n\n{}\n",
            BRIGHT,
            CYAN,
            project,
            timestamp,
            RESET,
            rule(),
            dim(NO_HISTORY)
        )
    }

    fn header(&self, project: &str, timestamp: &str) -> Vec<String> {
        vec![
            String::new(),
            format!("{}{}[{}] recent context, {}{}", BRIGHT, CYAN, project, timestamp, RESET),
            rule(),
            String::new(),
        ]
    }

    fn legend(&self, entries: &[LegendEntry]) -> Vec<String> {
        vec![dim(&format!("Legend: {}", legend_text(entries))), String::new()]
    }

    fn column_key(&self) -> Vec<String> {
        vec![
            format!("{}Column Key{}", BRIGHT, RESET),
            dim(&format!("  Read: {}", COLUMN_KEY_READ)),
            dim(&format!("  Work: {}", COLUMN_KEY_WORK)),
            String::new(),
        ]
    }

    fn guidance(&self) -> Vec<String> {
        let mut lines = vec![
            dim(&format!("Context Index: {}", GUIDANCE_INDEX)),
            String::new(),
            dim(GUIDANCE_LEAD),
        ];
        lines.extend(GUIDANCE_TIPS.iter().map(|tip| dim(&format!("  - {}", tip))));
        lines.push(String::new());
        lines
    }

    fn economics(&self, view: &EconomicsView) -> Vec<String> {
        let mut lines = vec![
            format!("{}{}Context Economics{}", BRIGHT, CYAN, RESET),
            dim(&format!(
                "  Loading: {} observations ({} tokens to read)",
                view.total_observations,
                thousands(view.total_read_tokens as i64)
            )),
            dim(&format!(
                "  Work investment: {} tokens spent on research, building, and decisions",
                thousands(view.total_discovery_tokens)
            )),
        ];
        if let Some(savings) = &view.savings {
            lines.push(format!("{}  Your savings: {}{}", GREEN, savings_text(savings), RESET));
        }
        lines.push(String::new());
        lines
    }

    fn date_header(&self, label: &str) -> Vec<String> {
        vec![format!("{}{}{}{}", BRIGHT, CYAN, label, RESET), String::new()]
    }

    fn file_label(&self, file: &str) -> Vec<String> {
        vec![dim(file)]
    }

    fn table_header(&self) -> Vec<String> {
        Vec::new()
    }

    fn compact_row(&self, row: &ObservationRow) -> String {
        format!(
            "  {}#{}{}  {}  {}  {} {} {}",
            DIM,
            row.id,
            RESET,
            time_cell(row),
            row.icon,
            row.title,
            read_cell(row),
            work_cell(row)
        )
    }

    fn expanded(&self, row: &ObservationRow, body: Option<&str>) -> Vec<String> {
        let mut lines = vec![format!(
            "  {}#{}{}  {}  {}  {}{}{}",
            DIM,
            row.id,
            RESET,
            time_cell(row),
            row.icon,
            BRIGHT,
            row.title,
            RESET
        )];
        if let Some(body) = body {
            lines.push(format!("    {}", dim(body)));
        }

        let (read, work) = (read_cell(row), work_cell(row));
        if !read.is_empty() || !work.is_empty() {
            lines.push(format!("    {} {}", read, work));
        }
        lines.push(String::new());
        lines
    }

    fn summary_row(&self, row: &SummaryRow) -> Vec<String> {
        vec![
            format!("{}#S{}{} {} ({})", YELLOW, row.id, RESET, row.request, row.time),
            String::new(),
        ]
    }

    fn last_summary(&self, lines: &[CalloutLine]) -> Vec<String> {
        lines
            .iter()
            .flat_map(|line| {
                [
                    format!(
                        "{}{}:{} {}",
                        callout_color(line.label),
                        line.label.as_str(),
                        RESET,
                        line.text
                    ),
                    String::new(),
                ]
            })
            .collect()
    }

    fn previously(&self, message: &str) -> Vec<String> {
        vec![
            String::new(),
            "---".to_string(),
            String::new(),
            format!("{}{}Previously{}", BRIGHT, MAGENTA, RESET),
            String::new(),
            dim(&format!("A: {}", message)),
            String::new(),
        ]
    }

    fn teaser(&self, discovery_thousands: i64, read_tokens: usize) -> Vec<String> {
        vec![String::new(), dim(&teaser_text(discovery_thousands, read_tokens))]
    }
}
