//! Core context assembly: settings, vocabularies and timeline layout

mod config;
pub mod datetime;
mod timeline;
mod vocabulary;

pub use config::{
    FullField, RenderConfig, Settings, DEFAULT_OBSERVATION_CONCEPTS, DEFAULT_OBSERVATION_TYPES,
};
pub use timeline::{
    assemble, file_group, full_observation_ids, merge_timeline, summary_spans, DayGroup, Segment,
    SummarySpan, TimedObservation, Timeline, TimelineRow, GENERAL_GROUP,
};
pub use vocabulary::{
    ConceptEntry, LegendEntry, Mode, TypeEntry, VocabularyProvider, DEFAULT_ICON, DEFAULT_MODE,
};
