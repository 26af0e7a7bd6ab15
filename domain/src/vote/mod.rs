//! Vote text domain
//!
//! Turning one post's raw text into structured, comparable vote values.
//!
//! ```text
//! raw line -> lexer -> VoteLine -> classifier -> VoteLineBlock (+ plan label)
//! ```
//!
//! - [`lexer::parse_line`]: tokenize one line, or reject it as narrative
//! - [`line::VoteLine`]: immutable single-line value with marker-blind
//!   semantic equality
//! - [`block::VoteLineBlock`]: non-empty ordered line group, the unit
//!   votes aggregate under
//! - [`blocks`]: depth-0 segmentation and plan-label classification
//! - [`trim`]: extended-text trimming for long free-form lines

pub mod block;
pub mod blocks;
pub mod lexer;
pub mod line;
pub mod trim;

// Re-export main types
pub use block::VoteLineBlock;
pub use blocks::{
    classify_plan_label, implicit_plan_name, is_base_plan, is_content_block, is_explicit_plan,
    is_implicit_plan, plan_block_name, split_into_blocks, PlanLabelKind,
};
pub use lexer::{parse_line, strip_bb_code};
pub use line::{MarkerType, VoteLine};
pub use trim::trim_extended_content;
