//! Context document model and its markdown / terminal renderers

mod backend;
mod document;
mod format;
mod markdown;
pub mod terminal;

pub use backend::Backend;
pub use document::{
    Block, CalloutLabel, CalloutLine, ContextInput, DayView, Document, DocumentBuilder,
    EconomicsView, ObservationRow, Savings, Section, SummaryRow, WorkTokens,
};
pub use format::thousands;
pub use markdown::Markdown;
pub use terminal::Terminal;

/// Render with the terminal backend when `terminal` is set, markdown otherwise
pub fn render(document: &Document, terminal: bool) -> String {
    if terminal {
        Terminal.render(document)
    } else {
        Markdown.render(document)
    }
}
