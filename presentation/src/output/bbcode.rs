//! BBCode output formatter for reposting a tally to the thread

use crate::output::formatter::{task_changed, ReportOptions, TallyFormatter};
use tally_application::{TalliedVote, TallyResult};
use tally_domain::{Origin, TALLY_POST_MARK};

/// Formats tally results as forum-ready BBCode
pub struct BbCodeFormatter;

impl BbCodeFormatter {
    /// Format the complete tally result as a postable BBCode body
    pub fn format(result: &TallyResult, options: &ReportOptions) -> String {
        let mut output = String::new();

        output.push_str(&format!("[b]Tally: {}[/b]\n", result.quest_name));

        let mut current_task: Option<&str> = None;
        for vote in &result.votes {
            if task_changed(current_task, vote.vote.task()) {
                output.push_str(&format!("\n[b]Task: {}[/b]\n", vote.vote.task()));
                current_task = Some(vote.vote.task());
            }
            output.push_str(&Self::format_vote(vote, options));
        }

        // The mark keeps reposted tallies out of the next tally run.
        output.push_str(&format!(
            "\n{} Tallied by tallyho {}\n",
            TALLY_POST_MARK,
            env!("CARGO_PKG_VERSION")
        ));

        output
    }

    fn format_vote(vote: &TalliedVote, options: &ReportOptions) -> String {
        let mut output = String::new();

        output.push('\n');
        for line in vote.vote.lines() {
            output.push_str(&Self::restore_markup(&line.to_string()));
            output.push('\n');
        }
        for origin in &vote.supporters {
            output.push_str(&Self::voter_link(origin, options));
            output.push('\n');
        }
        output.push_str(&format!("No. of votes: {}\n", vote.voter_count()));

        output
    }

    /// Turn sentinel characters back into the BBCode they stood for.
    fn restore_markup(text: &str) -> String {
        text.replace('『', "[")
            .replace('』', "]")
            .replace('❰', "[s]")
            .replace('❱', "[/s]")
            .replace('⦂', " ")
    }

    fn voter_link(origin: &Origin, options: &ReportOptions) -> String {
        let name = if options.debug {
            format!("{} (#{})", origin.name(), origin.post_number())
        } else {
            origin.name().to_string()
        };
        if origin.permalink().is_empty() {
            name
        } else {
            format!("[url={}]{}[/url]", origin.permalink(), name)
        }
    }
}

impl TallyFormatter for BbCodeFormatter {
    fn format(&self, result: &TallyResult, options: &ReportOptions) -> String {
        Self::format(result, options)
    }
}
