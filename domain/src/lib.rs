//! Domain layer for tallyho
//!
//! This crate contains the core tallying logic: vote value types, the
//! resolution and partitioning engine, the aggregation store, and the
//! compaction tree. It has no dependencies on infrastructure or
//! presentation concerns: no I/O, no logging, no configuration files.
//!
//! # Core Concepts
//!
//! ## Vote
//!
//! Participants vote by writing marked lines (`[x] Take the pass`) in
//! forum posts. Lines group into blocks, blocks resolve references to
//! plans and other voters, and the resolved blocks aggregate under
//! canonical, marker-stripped keys.
//!
//! ## Resolution
//!
//! - **Plan**: a named, reusable vote body other posts can reference
//! - **Proxy**: a vote line naming another voter, adopting their vote
//! - **Forward reference**: a proxy whose target isn't processed yet;
//!   the post defers and the caller retries it on a later pass

pub mod compact;
pub mod construct;
pub mod core;
pub mod index;
pub mod origin;
pub mod post;
pub mod quest;
pub mod storage;
pub mod vote;

// Re-export commonly used types
pub use compact::{build_compaction_tree, CompactVote};
pub use construct::{
    build_working_vote, emit_canonical_votes, extract_plans, normalize_plan, partition,
    partition_plan_body, PlanKind, PlanScope, WorkingVoteOutcome,
};
pub use crate::core::error::DomainError;
pub use index::{StoredPlan, VoteIndex};
pub use origin::{IdentityKind, Origin};
pub use post::{Post, WorkingVoteEntry, TALLY_POST_MARK};
pub use quest::{ContentFilter, PartitionMode, PlanBodyMode, Quest, TaskFilter};
pub use storage::{Category, VoteEntry, VoteStorage, VoterStorage};

// Re-export vote value types
pub use vote::{
    classify_plan_label, parse_line, split_into_blocks, strip_bb_code, MarkerType, PlanLabelKind,
    VoteLine, VoteLineBlock,
};
