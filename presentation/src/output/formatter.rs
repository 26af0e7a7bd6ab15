//! Output formatter trait and shared rendering options

use clap::ValueEnum;
use tally_application::TallyResult;
use tally_domain::core::string::agnostic_eq;

/// How much of each vote's structure a report shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DisplayMode {
    /// Every vote with its full line structure and voter list
    #[default]
    Full,
    /// Grouped first lines with support counts
    Compact,
}

impl DisplayMode {
    /// Parse the config-file spelling of a display mode.
    pub fn parse_config(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Some(DisplayMode::Full),
            "compact" => Some(DisplayMode::Compact),
            _ => None,
        }
    }
}

/// Rendering options shared by all formatters
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub display: DisplayMode,
    /// Annotate voter names with the post number their vote came from
    pub debug: bool,
}

/// Trait for formatting tally results
pub trait TallyFormatter {
    /// Format the complete tally result as display text
    fn format(&self, result: &TallyResult, options: &ReportOptions) -> String;
}

/// True when `task` opens a new display group. Tallied votes arrive
/// sorted by task, with untasked votes first; those never get a header.
pub(crate) fn task_changed(current: Option<&str>, task: &str) -> bool {
    match current {
        None => !task.is_empty(),
        Some(prev) => !agnostic_eq(prev, task),
    }
}
