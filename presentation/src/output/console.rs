//! Console output formatter for tally results

use crate::output::formatter::{task_changed, DisplayMode, ReportOptions, TallyFormatter};
use colored::Colorize;
use tally_application::{TalliedVote, TallyResult, TallyStatistics};
use tally_domain::core::string::truncate;
use tally_domain::{build_compaction_tree, CompactVote, Origin, VoteLineBlock};

/// Formats tally results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete tally result
    pub fn format(result: &TallyResult, options: &ReportOptions) -> String {
        match options.display {
            DisplayMode::Full => Self::format_full(result, options),
            DisplayMode::Compact => Self::format_compact(result, options),
        }
    }

    fn format_full(result: &TallyResult, options: &ReportOptions) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Tally: {}", result.quest_name)));
        output.push('\n');

        if result.votes.is_empty() {
            output.push_str(&format!("\n{}\n", "No votes found.".dimmed()));
        }

        // Votes arrive sorted by task, so one linear walk groups them.
        let mut current_task: Option<&str> = None;
        for vote in &result.votes {
            if task_changed(current_task, vote.vote.task()) {
                output.push_str(&Self::section_header(&format!("Task: {}", vote.vote.task())));
                current_task = Some(vote.vote.task());
            }
            output.push_str(&Self::format_vote(vote, options));
        }

        output.push_str(&Self::statistics(&result.statistics));
        output.push_str(&Self::footer());

        output
    }

    fn format_compact(result: &TallyResult, options: &ReportOptions) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Tally: {}", result.quest_name)));
        output.push('\n');

        if result.votes.is_empty() {
            output.push_str(&format!("\n{}\n", "No votes found.".dimmed()));
        }

        let snapshot: Vec<(VoteLineBlock, Vec<Origin>)> = result
            .votes
            .iter()
            .map(|vote| (vote.vote.clone(), vote.supporters.clone()))
            .collect();

        for root in build_compaction_tree(&snapshot) {
            output.push('\n');
            output.push_str(&Self::format_compact_node(&root, 0, options));
        }

        output.push_str(&Self::statistics(&result.statistics));
        output.push_str(&Self::footer());

        output
    }

    /// Render one node of the compaction forest. Grandchildren are
    /// elided: two levels is enough to see where support splits.
    fn format_compact_node(node: &CompactVote, depth: usize, options: &ReportOptions) -> String {
        let mut output = String::new();

        let indent = "    ".repeat(depth);
        let text = truncate(&node.line().to_string(), 100);
        let count = format!("({})", node.voter_count());
        if options.debug {
            let voters = Self::voter_list(node.voters(), options);
            output.push_str(&format!(
                "{}{} {} {}\n",
                indent,
                count.green().bold(),
                text,
                format!("[{}]", voters).dimmed()
            ));
        } else {
            output.push_str(&format!("{}{} {}\n", indent, count.green().bold(), text));
        }

        if depth == 0 {
            for child in node.children() {
                output.push_str(&Self::format_compact_node(child, 1, options));
            }
        }

        output
    }

    fn format_vote(vote: &TalliedVote, options: &ReportOptions) -> String {
        let mut output = String::new();

        let count = vote.voter_count();
        output.push_str(&format!(
            "\n{} {}\n",
            format!("[{}]", vote.category).yellow().bold(),
            Self::voter_count_label(count).dimmed()
        ));

        for line in vote.vote.lines() {
            output.push_str(&format!("  {}\n", line));
        }

        output.push_str(&format!(
            "  {} {}\n",
            "Voters:".dimmed(),
            Self::voter_list(&vote.supporters, options)
        ));

        output
    }

    fn statistics(stats: &TallyStatistics) -> String {
        let mut output = String::new();

        output.push_str(&Self::section_header("Statistics"));
        output.push_str(&format!(
            "{} {} scanned, {} with votes, {} processed\n",
            "Posts:".dimmed(),
            stats.posts_scanned,
            stats.vote_posts,
            stats.processed_posts
        ));
        output.push_str(&format!(
            "{} {}   {} {}\n",
            "Voters:".dimmed(),
            stats.voter_count,
            "Plans:".dimmed(),
            stats.plan_count
        ));

        if !stats.unresolved.is_empty() {
            let listed = stats
                .unresolved
                .iter()
                .map(|(author, number)| format!("{} (post {})", author, number))
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!("{} {}\n", "Unresolved:".red().bold(), listed));
        }

        output
    }

    fn voter_list(supporters: &[Origin], options: &ReportOptions) -> String {
        supporters
            .iter()
            .map(|origin| Self::voter_label(origin, options))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn voter_label(origin: &Origin, options: &ReportOptions) -> String {
        if options.debug {
            format!("{} (#{})", origin.name(), origin.post_number())
        } else {
            origin.name().to_string()
        }
    }

    fn voter_count_label(count: usize) -> String {
        if count == 1 {
            "1 voter".to_string()
        } else {
            format!("{} voters", count)
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl TallyFormatter for ConsoleFormatter {
    fn format(&self, result: &TallyResult, options: &ReportOptions) -> String {
        Self::format(result, options)
    }
}
