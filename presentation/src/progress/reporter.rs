//! Progress reporting for tally runs

use colored::Colorize;
use tally_application::TallyProgress;
use tally_domain::Post;

/// Simple text-based progress printed to stderr, so piping the report
/// to a file keeps it clean.
pub struct ConsoleProgress;

impl TallyProgress for ConsoleProgress {
    fn on_pass_start(&self, pass: usize, pending: usize) {
        eprintln!(
            "{} Pass {} ({} posts pending)",
            "->".cyan(),
            pass,
            pending
        );
    }

    fn on_post_processed(&self, post: &Post, emitted: usize) {
        eprintln!(
            "  {} {} (post {}): {} vote{}",
            "v".green(),
            post.origin().name(),
            post.origin().post_number(),
            emitted,
            if emitted == 1 { "" } else { "s" }
        );
    }

    fn on_pass_complete(&self, _pass: usize, processed: usize) {
        if processed == 0 {
            eprintln!("  {} no progress, stopping", "x".yellow());
        }
        eprintln!();
    }
}
