//! Run tally use case
//!
//! Orchestrates the full tally flow: voter and plan registration, the
//! multi-pass reference resolution loop, and aggregation into a result
//! ready for display.
//!
//! References can point at posts that appear later in the thread (a proxy
//! naming a voter who hasn't voted yet), so resolution runs as a fixed
//! point: every pass processes what it can, and the loop stops when all
//! vote posts are processed or a pass makes no progress. Posts still
//! unresolved at that point are excluded from the tally and reported in
//! the statistics.

use crate::config::TallyBehavior;
use crate::index::QuestIndex;
use crate::ports::progress::{NoProgress, TallyProgress};
use serde::Serialize;
use tally_domain::core::string::agnostic_cmp;
use tally_domain::{
    build_working_vote, emit_canonical_votes, extract_plans, normalize_plan, Category, Origin,
    PlanKind, PlanScope, Post, Quest, StoredPlan, VoteLineBlock, WorkingVoteOutcome,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during a tally run
#[derive(Error, Debug)]
pub enum RunTallyError {
    #[error("No posts to tally")]
    NoPosts,
}

/// One aggregated vote with its current supporters, ready for display
#[derive(Debug, Clone, Serialize)]
pub struct TalliedVote {
    /// The canonical (marker-stripped) vote block
    pub vote: VoteLineBlock,
    /// Derived display category: the supporters' majority marker type
    pub category: Category,
    /// Supporting voters, ordered by folded name
    pub supporters: Vec<Origin>,
}

impl TalliedVote {
    pub fn voter_count(&self) -> usize {
        self.supporters.len()
    }
}

/// Run counters, plus the fail-soft record of what couldn't be resolved
#[derive(Debug, Clone, Default, Serialize)]
pub struct TallyStatistics {
    /// Posts handed to the run, votes or not
    pub posts_scanned: usize,
    /// Posts carrying at least one vote line
    pub vote_posts: usize,
    /// Vote posts fully resolved and partitioned
    pub processed_posts: usize,
    /// `(author, post number)` of vote posts left unresolved
    pub unresolved: Vec<(String, u32)>,
    /// Plans registered across the pre-passes
    pub plan_count: usize,
    /// Distinct voters with a standing vote
    pub voter_count: usize,
}

/// Outcome of a tally run
#[derive(Debug, Clone, Serialize)]
pub struct TallyResult {
    pub quest_name: String,
    pub votes: Vec<TalliedVote>,
    pub statistics: TallyStatistics,
}

/// Use case for tallying a thread's posts into aggregated votes
pub struct RunTallyUseCase {
    behavior: TallyBehavior,
}

impl RunTallyUseCase {
    pub fn new(behavior: TallyBehavior) -> Self {
        Self { behavior }
    }

    /// Execute the use case with default (no-op) progress
    pub fn execute(&self, posts: Vec<Post>, quest: &Quest) -> Result<TallyResult, RunTallyError> {
        self.execute_with_progress(posts, quest, &NoProgress)
    }

    /// Execute the use case with progress callbacks
    pub fn execute_with_progress(
        &self,
        mut posts: Vec<Post>,
        quest: &Quest,
        progress: &dyn TallyProgress,
    ) -> Result<TallyResult, RunTallyError> {
        if posts.is_empty() {
            return Err(RunTallyError::NoPosts);
        }

        let posts_scanned = posts.len();
        let vote_posts = posts.iter().filter(|p| p.has_vote()).count();
        info!(
            "Tallying {} over {} posts ({} with votes)",
            quest.name(),
            posts_scanned,
            vote_posts
        );

        let mut index = QuestIndex::new();
        // Every author is a potential proxy target, vote or not.
        for post in &posts {
            index.register_voter(post.origin());
            index.record_post(post);
        }

        self.register_plans(&posts, quest, &mut index);

        // Fixed point over the resolution phases: a pass that processes
        // nothing can't unblock anything either, so stop there.
        let mut pass = 0;
        loop {
            let pending = pending_count(&posts);
            if pending == 0 {
                break;
            }
            pass += 1;
            progress.on_pass_start(pass, pending);
            let progressed = self.resolve_pass(&mut posts, quest, &mut index, progress);
            progress.on_pass_complete(pass, progressed);
            debug!("Pass {} processed {} of {} pending posts", pass, progressed, pending);
            if progressed == 0 {
                break;
            }
        }

        if self.behavior.resolve_stalled_references && pending_count(&posts) > 0 {
            let pending = pending_count(&posts);
            info!("Force-processing {} stalled vote posts", pending);
            for post in posts.iter_mut().filter(|p| p.has_vote() && !p.processed()) {
                post.set_force_process(true);
            }
            pass += 1;
            progress.on_pass_start(pass, pending);
            let progressed = self.resolve_pass(&mut posts, quest, &mut index, progress);
            progress.on_pass_complete(pass, progressed);
        }

        let unresolved: Vec<(String, u32)> = posts
            .iter()
            .filter(|p| p.has_vote() && !p.processed())
            .map(|p| (p.author().to_string(), p.origin().post_number()))
            .collect();
        for (author, number) in &unresolved {
            warn!("Vote in post {} by {} could not be resolved", number, author);
        }

        let statistics = TallyStatistics {
            posts_scanned,
            vote_posts,
            processed_posts: posts
                .iter()
                .filter(|p| p.has_vote() && p.processed())
                .count(),
            unresolved,
            plan_count: index.plan_count(),
            voter_count: index.storage().voter_count(),
        };

        Ok(TallyResult {
            quest_name: quest.name().to_string(),
            votes: collect_votes(&index),
            statistics,
        })
    }

    /// Register every plan definition before any vote resolves, so plan
    /// references work regardless of post order. Base and Proposed plans
    /// bind first, then explicit `Plan:` blocks, then whole-post implicit
    /// plans; within each pass the earliest definition of a name wins.
    fn register_plans(&self, posts: &[Post], quest: &Quest, index: &mut QuestIndex) {
        let passes = [
            (PlanScope::Blocks, PlanKind::Base),
            (PlanScope::Blocks, PlanKind::Explicit),
            (PlanScope::WholePost, PlanKind::Implicit),
        ];
        for (scope, kind) in passes {
            if kind == PlanKind::Implicit && quest.forbid_implicit_plans() {
                continue;
            }
            for post in posts {
                for (name, block) in extract_plans(post, quest, &*index, scope, kind) {
                    let origin = Origin::plan(&name)
                        .with_post(post.origin().post_id(), post.origin().post_number())
                        .with_thread(post.origin().thread_uri(), post.origin().permalink());
                    let plan = StoredPlan::new(origin, normalize_plan(&block));
                    if index.register_plan(plan) {
                        debug!(
                            "Registered plan {:?} from post {}",
                            name,
                            post.origin().post_number()
                        );
                    }
                }
            }
        }
    }

    /// One sweep over the unprocessed vote posts. Returns how many
    /// finished processing this pass.
    fn resolve_pass(
        &self,
        posts: &mut [Post],
        quest: &Quest,
        index: &mut QuestIndex,
        progress: &dyn TallyProgress,
    ) -> usize {
        let mut progressed = 0;
        for i in 0..posts.len() {
            if !posts[i].has_vote() || posts[i].processed() {
                continue;
            }
            if build_working_vote(&mut posts[i], quest, &*index) == WorkingVoteOutcome::Deferred {
                debug!(
                    "Deferring post {} by {}",
                    posts[i].origin().post_number(),
                    posts[i].author()
                );
                continue;
            }
            index.record_post(&posts[i]);
            let Some(blocks) = emit_canonical_votes(&mut posts[i], quest, &*index) else {
                continue;
            };
            // An empty emission (superseded, or everything filtered out)
            // replaces nothing; the author's standing support stays.
            if !blocks.is_empty() {
                index.storage_mut().remove_voter(posts[i].origin());
                for block in &blocks {
                    index.storage_mut().add_support(block, posts[i].origin());
                }
                index.storage_mut().prune_unsupported();
            }
            index.record_post(&posts[i]);
            progress.on_post_processed(&posts[i], blocks.len());
            progressed += 1;
        }
        progressed
    }
}

fn pending_count(posts: &[Post]) -> usize {
    posts
        .iter()
        .filter(|p| p.has_vote() && !p.processed())
        .count()
}

/// Snapshot the storage into a deterministically ordered vote list:
/// votes by task then by the line comparator, supporters by name.
fn collect_votes(index: &QuestIndex) -> Vec<TalliedVote> {
    let mut votes: Vec<TalliedVote> = index
        .storage()
        .all_votes()
        .map(|entry| {
            let mut supporters: Vec<Origin> = entry.supporters.keys().cloned().collect();
            supporters.sort_by(|a, b| agnostic_cmp(a.name(), b.name()));
            TalliedVote {
                vote: entry.vote.clone(),
                category: entry.category,
                supporters,
            }
        })
        .collect();
    votes.sort_by(|a, b| {
        agnostic_cmp(a.vote.task(), b.vote.task())
            .then_with(|| a.vote.first().compare(b.vote.first()))
    });
    votes
}
