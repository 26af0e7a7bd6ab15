//! Lookup interface the resolution engine depends on.

use crate::origin::Origin;
use crate::post::Post;
use crate::vote::block::VoteLineBlock;

/// A registered plan: who defined it and its normalized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPlan {
    pub origin: Origin,
    pub block: VoteLineBlock,
}

impl StoredPlan {
    pub fn new(origin: Origin, block: VoteLineBlock) -> Self {
        Self { origin, block }
    }

    pub fn name(&self) -> &str {
        self.origin.name()
    }
}

/// What the resolution engine may ask about the rest of the thread.
///
/// All name lookups compare folded names (case, width, and punctuation
/// insensitive). Implemented by the application layer's quest index; the
/// engine itself never owns cross-post state.
pub trait VoteIndex {
    /// A plan registered under this name, with its normalized body.
    fn reference_plan(&self, name: &str) -> Option<&StoredPlan>;

    /// Every block the named voter currently supports.
    fn votes_by(&self, name: &str) -> Vec<VoteLineBlock>;

    /// The author's most recent post with a vote, optionally bounded to
    /// post ids at or below `id_ceiling` (pinned references).
    fn last_post_by_author(&self, name: &str, id_ceiling: Option<u64>) -> Option<&Post>;

    /// The registered voter identity for a name.
    fn voter_origin(&self, name: &str) -> Option<&Origin>;

    /// The registered plan identity for a name.
    fn plan_origin(&self, name: &str) -> Option<&Origin>;

    fn has_voter(&self, name: &str) -> bool;

    fn has_plan(&self, name: &str) -> bool;

    /// Whether a strictly newer vote post by the same author has already
    /// been processed, superseding this one.
    fn has_newer_vote(&self, post: &Post) -> bool;
}
