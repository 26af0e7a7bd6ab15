//! Application layer for tallyho
//!
//! This crate contains use cases, port definitions, and application
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod index;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::TallyBehavior;
pub use index::QuestIndex;
pub use ports::{
    post_source::{PostSource, SourceError},
    progress::{NoProgress, TallyProgress},
};
pub use use_cases::run_tally::{
    RunTallyError, RunTallyUseCase, TalliedVote, TallyResult, TallyStatistics,
};
