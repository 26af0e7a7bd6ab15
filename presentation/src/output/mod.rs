//! Output formatting for tally results

pub mod bbcode;
pub mod console;
pub mod formatter;
pub mod json;

pub use bbcode::BbCodeFormatter;
pub use console::ConsoleFormatter;
pub use formatter::{DisplayMode, ReportOptions, TallyFormatter};
pub use json::JsonFormatter;
