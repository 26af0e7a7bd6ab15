//! A forum post and its resolution state.

use serde::{Deserialize, Serialize};

use crate::origin::Origin;
use crate::vote::block::VoteLineBlock;
use crate::vote::lexer::parse_line;
use crate::vote::line::VoteLine;

/// Marks a line of a re-posted tally; such posts never count as votes.
pub const TALLY_POST_MARK: &str = "#####";

/// One entry of a post's working vote: either a literal line the author
/// wrote, or a whole block substituted in for a plan or proxy reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkingVoteEntry {
    Line(VoteLine),
    Block(VoteLineBlock),
}

impl WorkingVoteEntry {
    pub fn as_line(&self) -> Option<&VoteLine> {
        match self {
            WorkingVoteEntry::Line(line) => Some(line),
            WorkingVoteEntry::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&VoteLineBlock> {
        match self {
            WorkingVoteEntry::Line(_) => None,
            WorkingVoteEntry::Block(block) => Some(block),
        }
    }
}

/// A participant's post (Entity).
///
/// The post owns its lexed vote lines and the two-phase resolution state:
/// the working vote is built once (`working_vote_complete`), then
/// partitioned into canonical votes once (`processed`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    origin: Origin,
    text: String,
    vote_lines: Vec<VoteLine>,
    tally_post: bool,
    working_vote: Vec<WorkingVoteEntry>,
    working_vote_complete: bool,
    processed: bool,
    force_process: bool,
}

impl Post {
    /// Lex a post's text. Non-vote lines are dropped; a `#####` line marks
    /// the whole post as a re-posted tally and clears its vote lines.
    pub fn new(origin: Origin, text: impl Into<String>) -> Self {
        let text = text.into();
        let tally_post = text
            .lines()
            .any(|line| line.starts_with(TALLY_POST_MARK));
        let vote_lines = if tally_post {
            Vec::new()
        } else {
            text.lines().filter_map(parse_line).collect()
        };
        Self {
            origin,
            text,
            vote_lines,
            tally_post,
            working_vote: Vec::new(),
            working_vote_complete: false,
            processed: false,
            force_process: false,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn author(&self) -> &str {
        self.origin.name()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn vote_lines(&self) -> &[VoteLine] {
        &self.vote_lines
    }

    /// Whether this post contains anything to tally.
    pub fn has_vote(&self) -> bool {
        !self.vote_lines.is_empty()
    }

    /// Whether the post is itself a posted tally (excluded from counting).
    pub fn is_tally_post(&self) -> bool {
        self.tally_post
    }

    pub fn working_vote(&self) -> &[WorkingVoteEntry] {
        &self.working_vote
    }

    pub fn working_vote_complete(&self) -> bool {
        self.working_vote_complete
    }

    pub fn processed(&self) -> bool {
        self.processed
    }

    pub fn force_process(&self) -> bool {
        self.force_process
    }

    /// Install the resolved working vote and mark phase 2 complete.
    pub fn set_working_vote(&mut self, entries: Vec<WorkingVoteEntry>) {
        self.working_vote = entries;
        self.working_vote_complete = true;
    }

    pub fn mark_processed(&mut self) {
        self.processed = true;
    }

    /// Opt this post into the salvage pass: proxy targets fall back to
    /// their most recent processed vote instead of deferring.
    pub fn set_force_process(&mut self, force: bool) {
        self.force_process = force;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str) -> Post {
        Post::new(Origin::user("Kinematics"), text)
    }

    #[test]
    fn test_lexing_keeps_vote_lines_only() {
        let p = post("Some musing first.\n[x] Option A\n-[x] Detail\nAnd a closing remark.");
        assert!(p.has_vote());
        assert_eq!(p.vote_lines().len(), 2);
        assert_eq!(p.vote_lines()[1].depth(), 1);
    }

    #[test]
    fn test_tally_posts_are_excluded() {
        let p = post("##### Tally of 2024-06-01\n[x] Option A");
        assert!(p.is_tally_post());
        assert!(!p.has_vote());
        assert!(p.vote_lines().is_empty());
    }

    #[test]
    fn test_resolution_flags_start_cleared() {
        let mut p = post("[x] Option A");
        assert!(!p.working_vote_complete());
        assert!(!p.processed());

        p.set_working_vote(vec![WorkingVoteEntry::Line(p.vote_lines()[0].clone())]);
        assert!(p.working_vote_complete());
        assert_eq!(p.working_vote().len(), 1);

        p.mark_processed();
        assert!(p.processed());
    }
}
