//! Canonical vote aggregation: who supports what.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::string::agnostic_fold;
use crate::origin::Origin;
use crate::vote::block::VoteLineBlock;
use crate::vote::line::MarkerType;

/// Percentage share a marker type needs among supporters to set a vote's
/// category.
const CATEGORY_THRESHOLD: usize = 83;

/// The derived kind of an aggregated vote, recomputed from its current
/// supporters and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Vote,
    Rank,
    Score,
    Approval,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vote => "Vote",
            Category::Rank => "Rank",
            Category::Score => "Score",
            Category::Approval => "Approval",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Each supporter's own fully marked version of a canonical vote.
pub type VoterStorage = HashMap<Origin, VoteLineBlock>;

/// One aggregated vote, yielded by [`VoteStorage::all_votes`].
#[derive(Debug, Clone, Copy)]
pub struct VoteEntry<'a> {
    pub vote: &'a VoteLineBlock,
    pub category: Category,
    pub supporters: &'a VoterStorage,
}

/// Map from canonical vote (marker stripped to None) to its supporters.
///
/// Invariant: after [`prune_unsupported`](VoteStorage::prune_unsupported),
/// every canonical entry has at least one supporter. Callers prune after
/// every removal; entries are created on first support and never left
/// empty across a consistent read.
#[derive(Debug, Clone, Default)]
pub struct VoteStorage {
    votes: HashMap<VoteLineBlock, VoterStorage>,
    voter_names: HashSet<String>,
}

impl VoteStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a voter's support, overwriting any prior version of theirs
    /// under the same canonical key.
    pub fn add_support(&mut self, vote: &VoteLineBlock, voter: &Origin) {
        self.votes
            .entry(vote.canonical())
            .or_default()
            .insert(voter.clone(), vote.clone());
        self.voter_names.insert(voter.folded_name());
    }

    /// Withdraw one voter's support for one vote.
    pub fn remove_support(&mut self, vote: &VoteLineBlock, voter: &Origin) {
        if let Some(supporters) = self.votes.get_mut(&vote.canonical()) {
            supporters.remove(voter);
        }
        self.forget_if_unsupported(voter);
    }

    /// Withdraw a voter's support everywhere.
    pub fn remove_voter(&mut self, voter: &Origin) {
        for supporters in self.votes.values_mut() {
            supporters.remove(voter);
        }
        self.voter_names.remove(&voter.folded_name());
    }

    /// Drop canonical entries left with zero supporters. Callers invoke
    /// this after every removal.
    pub fn prune_unsupported(&mut self) {
        self.votes.retain(|_, supporters| !supporters.is_empty());
    }

    /// Every block the voter currently supports, as they cast it.
    pub fn votes_by(&self, voter: &Origin) -> Vec<VoteLineBlock> {
        self.votes
            .values()
            .filter_map(|supporters| supporters.get(voter).cloned())
            .collect()
    }

    pub fn supporters_of(&self, vote: &VoteLineBlock) -> Option<&VoterStorage> {
        self.votes.get(&vote.canonical())
    }

    /// All aggregated votes, each with its lazily recomputed category.
    pub fn all_votes(&self) -> impl Iterator<Item = VoteEntry<'_>> {
        self.votes.iter().map(|(vote, supporters)| VoteEntry {
            vote,
            category: derive_category(supporters),
            supporters,
        })
    }

    /// Constant-time membership test against the voter-name mirror.
    pub fn has_voter_name(&self, name: &str) -> bool {
        self.voter_names.contains(&agnostic_fold(name))
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Distinct voters across every entry.
    pub fn voter_count(&self) -> usize {
        let mut seen: HashSet<&Origin> = HashSet::new();
        for supporters in self.votes.values() {
            seen.extend(supporters.keys());
        }
        seen.len()
    }

    fn forget_if_unsupported(&mut self, voter: &Origin) {
        let supported = self
            .votes
            .values()
            .any(|supporters| supporters.contains_key(voter));
        if !supported {
            self.voter_names.remove(&voter.folded_name());
        }
    }
}

/// Majority marker type among supporters, when it reaches the threshold
/// share; plain Vote otherwise.
fn derive_category(supporters: &VoterStorage) -> Category {
    let total = supporters.len();
    if total == 0 {
        return Category::Vote;
    }
    let mut counts: HashMap<Category, usize> = HashMap::new();
    for block in supporters.values() {
        let category = match block.marker_type() {
            MarkerType::Rank => Category::Rank,
            MarkerType::Score => Category::Score,
            MarkerType::Approval => Category::Approval,
            MarkerType::None | MarkerType::Vote | MarkerType::Plan => Category::Vote,
        };
        *counts.entry(category).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| count * 100 >= total * CATEGORY_THRESHOLD)
        .max_by_key(|(_, count)| *count)
        .map(|(category, _)| category)
        .unwrap_or(Category::Vote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::lexer::parse_line;

    fn block(text: &str) -> VoteLineBlock {
        VoteLineBlock::from_line(parse_line(text).expect("vote line"))
    }

    fn supporter_count(storage: &VoteStorage, vote: &VoteLineBlock) -> usize {
        storage.supporters_of(vote).map_or(0, VoterStorage::len)
    }

    #[test]
    fn test_add_then_remove_restores_count() {
        let mut storage = VoteStorage::new();
        let vote = block("[x] Tea");
        storage.add_support(&vote, &Origin::user("Alice"));
        storage.add_support(&vote, &Origin::user("Bob"));
        assert_eq!(supporter_count(&storage, &vote), 2);

        storage.add_support(&vote, &Origin::user("Carol"));
        storage.remove_support(&vote, &Origin::user("Carol"));
        storage.prune_unsupported();
        assert_eq!(supporter_count(&storage, &vote), 2);
    }

    #[test]
    fn test_one_version_per_voter_per_canonical_key() {
        let mut storage = VoteStorage::new();
        let alice = Origin::user("Alice");
        storage.add_support(&block("[x] Tea"), &alice);
        storage.add_support(&block("[#2] Tea"), &alice);

        assert_eq!(storage.len(), 1);
        let supported = storage.votes_by(&alice);
        assert_eq!(supported.len(), 1);
        assert_eq!(supported[0].marker(), "#2");
    }

    #[test]
    fn test_prune_keeps_entries_supported() {
        let mut storage = VoteStorage::new();
        let tea = block("[x] Tea");
        let alice = Origin::user("Alice");
        storage.add_support(&tea, &alice);
        storage.add_support(&block("[x] Cake"), &Origin::user("Bob"));

        storage.remove_voter(&alice);
        storage.prune_unsupported();
        assert_eq!(storage.len(), 1);
        assert!(storage
            .all_votes()
            .all(|entry| !entry.supporters.is_empty()));
        assert!(storage.supporters_of(&tea).is_none());
    }

    #[test]
    fn test_voter_name_mirror_tracks_membership() {
        let mut storage = VoteStorage::new();
        let vote = block("[x] Tea");
        let alice = Origin::user("Alice");
        storage.add_support(&vote, &alice);
        assert!(storage.has_voter_name("ALICE"));
        assert!(!storage.has_voter_name("Bob"));

        storage.remove_support(&vote, &alice);
        storage.prune_unsupported();
        assert!(!storage.has_voter_name("Alice"));
    }

    #[test]
    fn test_category_needs_a_large_majority() {
        let mut storage = VoteStorage::new();
        for (i, marker) in ["[#1]", "[#2]", "[#1]", "[#3]", "[#2]"].iter().enumerate() {
            storage.add_support(&block(&format!("{marker} Tea")), &Origin::user(format!("V{i}")));
        }
        storage.add_support(&block("[x] Tea"), &Origin::user("V5"));
        // 5 of 6 ranked: 83.3% clears the bar
        let entry = storage.all_votes().next().unwrap();
        assert_eq!(entry.category, Category::Rank);

        let mut storage = VoteStorage::new();
        for (i, marker) in ["[#1]", "[#2]", "[#1]", "[#3]"].iter().enumerate() {
            storage.add_support(&block(&format!("{marker} Tea")), &Origin::user(format!("V{i}")));
        }
        storage.add_support(&block("[x] Tea"), &Origin::user("V4"));
        // 4 of 5 ranked: 80% does not
        let entry = storage.all_votes().next().unwrap();
        assert_eq!(entry.category, Category::Vote);
    }

    #[test]
    fn test_category_threshold_at_exactly_eighty_three_percent() {
        let mut storage = VoteStorage::new();
        for i in 0..83 {
            storage.add_support(&block("[#1] Tea"), &Origin::user(format!("R{i}")));
        }
        for i in 0..17 {
            storage.add_support(&block("[x] Tea"), &Origin::user(format!("P{i}")));
        }
        // 83 of 100 ranked: the share is reached, not exceeded
        let entry = storage.all_votes().next().unwrap();
        assert_eq!(entry.category, Category::Rank);

        // One ranked supporter recasts plain: 82 of 100 falls short
        storage.add_support(&block("[x] Tea"), &Origin::user("R0"));
        let entry = storage.all_votes().next().unwrap();
        assert_eq!(entry.category, Category::Vote);
    }

    #[test]
    fn test_votes_by_returns_as_cast_blocks() {
        let mut storage = VoteStorage::new();
        let alice = Origin::user("Alice");
        storage.add_support(&block("[95%] Tea"), &alice);
        storage.add_support(&block("[x] Cake"), &alice);

        let mut markers: Vec<String> = storage
            .votes_by(&alice)
            .iter()
            .map(|b| b.marker().to_string())
            .collect();
        markers.sort();
        assert_eq!(markers, vec!["95%", "x"]);
        assert_eq!(storage.voter_count(), 1);
    }
}
