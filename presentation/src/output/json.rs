//! JSON output formatter for machine consumption

use crate::output::formatter::{ReportOptions, TallyFormatter};
use tally_application::TallyResult;

/// Formats tally results as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(result: &TallyResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }
}

impl TallyFormatter for JsonFormatter {
    fn format(&self, result: &TallyResult, _options: &ReportOptions) -> String {
        Self::format(result)
    }
}
