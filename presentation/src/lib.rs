//! Presentation layer for tallyho
//!
//! This crate contains CLI definitions, output formatters, and
//! progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::bbcode::BbCodeFormatter;
pub use output::console::ConsoleFormatter;
pub use output::formatter::{DisplayMode, ReportOptions, TallyFormatter};
pub use output::json::JsonFormatter;
pub use progress::reporter::ConsoleProgress;
