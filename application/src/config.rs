//! Application-level behavior configuration.
//!
//! [`TallyBehavior`] groups the switches that control how the use case
//! drives the resolution engine across passes. Per-post policy (partition
//! mode, filters, proxy rules) belongs to the domain `Quest`; this is the
//! loop-level layer above it.

use serde::{Deserialize, Serialize};

/// Tally run behavior switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyBehavior {
    /// After the resolution loop stalls, run one more pass with
    /// force-processing enabled so stalled proxy references fall back to
    /// their target's last processed vote instead of staying unresolved.
    #[serde(default)]
    pub resolve_stalled_references: bool,
}

impl TallyBehavior {
    pub fn with_resolve_stalled_references(mut self, resolve: bool) -> Self {
        self.resolve_stalled_references = resolve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_stalled_references_unresolved() {
        let behavior = TallyBehavior::default();
        assert!(!behavior.resolve_stalled_references);
    }

    #[test]
    fn test_builder_enables_salvage_pass() {
        let behavior = TallyBehavior::default().with_resolve_stalled_references(true);
        assert!(behavior.resolve_stalled_references);
    }
}
