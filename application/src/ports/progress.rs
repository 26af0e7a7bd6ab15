//! Progress notification port
//!
//! Defines the interface for reporting progress during a tally run.

use tally_domain::Post;

/// Callback for progress updates during tally execution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, log output, etc.)
pub trait TallyProgress {
    /// Called when a resolution pass starts
    fn on_pass_start(&self, pass: usize, pending: usize);

    /// Called when a post finishes processing within a pass
    fn on_post_processed(&self, post: &Post, emitted: usize);

    /// Called when a resolution pass completes
    fn on_pass_complete(&self, pass: usize, processed: usize);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl TallyProgress for NoProgress {
    fn on_pass_start(&self, _pass: usize, _pending: usize) {}
    fn on_post_processed(&self, _post: &Post, _emitted: usize) {}
    fn on_pass_complete(&self, _pass: usize, _processed: usize) {}
}
