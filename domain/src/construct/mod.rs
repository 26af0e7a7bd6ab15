//! Vote construction engine
//!
//! Turns a post's lexed lines into canonical, countable vote blocks in
//! three gated phases:
//!
//! ```text
//! vote lines -> (1) extract plans      -> name to block definitions
//!            -> (2) resolve references -> working vote (lines + blocks)
//!            -> (3) partition          -> canonical VoteLineBlocks
//! ```
//!
//! Phase 2 may defer a post whose proxy target is not processed yet; the
//! caller retries deferred posts until a pass makes no progress. Phase 3
//! runs at most once per post, gated by the post's `processed` flag.

pub mod partition;
pub mod plans;
pub mod references;

// Re-export main types
pub use partition::{emit_canonical_votes, normalize_plan, partition, partition_plan_body};
pub use plans::{extract_plans, PlanKind, PlanScope};
pub use references::{build_working_vote, WorkingVoteOutcome};
