//! Quest index: the mutable lookup state of a tally run
//!
//! [`QuestIndex`] is the application-side implementation of the domain's
//! [`VoteIndex`] trait. It owns everything the resolution engine needs to
//! look up by name: registered voter identities, registered plans, post
//! snapshots, and the aggregation [`VoteStorage`].
//!
//! The engine mutates posts owned by the use case; the index holds
//! *snapshots* of them, refreshed through [`QuestIndex::record_post`]
//! after each mutation. Clone-on-update keeps the working set single-owner
//! while proxy resolution reads a consistent view of everyone else.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tally_domain::core::string::agnostic_fold;
use tally_domain::{Origin, Post, StoredPlan, VoteIndex, VoteLineBlock, VoteStorage};

/// Name-keyed lookup state for one tally run.
///
/// All name lookups go through the agnostic fold, so `"Good Voter"`,
/// `"goodvoter"` and the full-width spelling all reach the same entry.
#[derive(Debug, Default)]
pub struct QuestIndex {
    /// Folded name to voter identity, registered for every post author.
    voters: HashMap<String, Origin>,
    /// Folded name to registered plan; first registration wins.
    plans: HashMap<String, StoredPlan>,
    /// Folded author name to that author's post snapshots, in thread order.
    posts: HashMap<String, Vec<Post>>,
    /// Aggregated standing votes.
    storage: VoteStorage,
}

impl QuestIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a post author as a known voter. The first registration
    /// keeps its origin; later posts by the same name are the same voter.
    pub fn register_voter(&mut self, origin: &Origin) {
        self.voters
            .entry(origin.folded_name())
            .or_insert_with(|| origin.clone());
    }

    /// Register a plan under its folded name. Returns `false` when the
    /// name is already taken (the earlier definition stands).
    pub fn register_plan(&mut self, plan: StoredPlan) -> bool {
        match self.plans.entry(agnostic_fold(plan.name())) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(plan);
                true
            }
        }
    }

    /// Store or refresh the snapshot of a post. Matching is by post id,
    /// since every post by one author shares the same identity.
    pub fn record_post(&mut self, post: &Post) {
        let snapshots = self.posts.entry(post.origin().folded_name()).or_default();
        match snapshots
            .iter_mut()
            .find(|p| p.origin().post_id() == post.origin().post_id())
        {
            Some(slot) => *slot = post.clone(),
            None => snapshots.push(post.clone()),
        }
    }

    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    pub fn storage(&self) -> &VoteStorage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut VoteStorage {
        &mut self.storage
    }
}

impl VoteIndex for QuestIndex {
    fn reference_plan(&self, name: &str) -> Option<&StoredPlan> {
        self.plans.get(&agnostic_fold(name))
    }

    fn votes_by(&self, name: &str) -> Vec<VoteLineBlock> {
        match self.voters.get(&agnostic_fold(name)) {
            Some(origin) => self.storage.votes_by(origin),
            None => Vec::new(),
        }
    }

    fn last_post_by_author(&self, name: &str, id_ceiling: Option<u64>) -> Option<&Post> {
        let snapshots = self.posts.get(&agnostic_fold(name))?;
        snapshots
            .iter()
            .filter(|p| p.has_vote())
            .filter(|p| id_ceiling.is_none_or(|ceiling| p.origin().post_id() <= ceiling))
            .max_by_key(|p| p.origin().post_id())
    }

    fn voter_origin(&self, name: &str) -> Option<&Origin> {
        self.voters.get(&agnostic_fold(name))
    }

    fn plan_origin(&self, name: &str) -> Option<&Origin> {
        self.plans.get(&agnostic_fold(name)).map(|plan| &plan.origin)
    }

    fn has_voter(&self, name: &str) -> bool {
        self.voters.contains_key(&agnostic_fold(name))
    }

    fn has_plan(&self, name: &str) -> bool {
        self.plans.contains_key(&agnostic_fold(name))
    }

    fn has_newer_vote(&self, post: &Post) -> bool {
        let Some(snapshots) = self.posts.get(&post.origin().folded_name()) else {
            return false;
        };
        snapshots.iter().any(|p| {
            p.origin().post_id() > post.origin().post_id() && p.processed() && p.has_vote()
        })
    }
}
