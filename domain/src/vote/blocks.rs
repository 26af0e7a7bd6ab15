//! Segmenting a lexed line sequence into blocks and classifying plans.
//!
//! A "plan" is a named, reusable vote body. Explicit plans announce
//! themselves with a label on the first line (`Plan: X`, `Base Plan X`,
//! `Proposed Plan: X`); implicit plans are unlabeled nomination groups
//! detected over a whole post rather than a single block.

use crate::vote::block::VoteLineBlock;
use crate::vote::line::VoteLine;

/// Which label family opened a plan definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLabelKind {
    Plan,
    BasePlan,
    ProposedPlan,
}

impl PlanLabelKind {
    /// Base and Proposed labels mark an author's own draft, which is not a
    /// vote for its proposer.
    pub fn is_proposal(self) -> bool {
        matches!(self, PlanLabelKind::BasePlan | PlanLabelKind::ProposedPlan)
    }
}

/// Cut a flat ordered line sequence into blocks at every depth-0 line.
///
/// Lines deeper than 0 attach to the preceding depth-0 line. A leading run
/// of deeper lines with no parent forms its own block.
pub fn split_into_blocks(lines: Vec<VoteLine>) -> Vec<VoteLineBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<VoteLine> = Vec::new();
    for line in lines {
        if line.depth() == 0 && !current.is_empty() {
            blocks.push(VoteLineBlock::from_nonempty(current));
            current = Vec::new();
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(VoteLineBlock::from_nonempty(current));
    }
    blocks
}

/// Recognize a plan label on a line's clean content.
///
/// Matching is case-insensitive; the returned name is the text after the
/// label, trimmed but otherwise verbatim. A label with no name is not a
/// label.
pub fn classify_plan_label(line: &VoteLine) -> Option<(PlanLabelKind, String)> {
    let content = line.clean_content();
    if let Some(rest) = strip_word(content, "proposed").and_then(|r| strip_word(r, "plan")) {
        return label_name(rest, true).map(|name| (PlanLabelKind::ProposedPlan, name));
    }
    if let Some(rest) = strip_word(content, "base").and_then(|r| strip_word(r, "plan")) {
        return label_name(rest, false).map(|name| (PlanLabelKind::BasePlan, name));
    }
    if let Some(rest) = strip_word(content, "plan") {
        return label_name(rest, false).map(|name| (PlanLabelKind::Plan, name));
    }
    None
}

/// The plan name a block defines, if its first line carries any label.
pub fn plan_block_name(block: &VoteLineBlock) -> Option<String> {
    classify_plan_label(block.first()).map(|(_, name)| name)
}

/// A Base or Proposed Plan definition: proposal label plus a body.
pub fn is_base_plan(block: &VoteLineBlock) -> bool {
    block.len() > 1
        && classify_plan_label(block.first())
            .is_some_and(|(kind, _)| kind.is_proposal())
}

/// An explicit plan definition: plain `Plan` label plus a body. A bare
/// label with no body is a reference to someone else's plan, not a
/// definition.
pub fn is_explicit_plan(block: &VoteLineBlock) -> bool {
    block.len() > 1
        && classify_plan_label(block.first())
            .is_some_and(|(kind, _)| kind == PlanLabelKind::Plan)
}

/// Whole-post implicit-plan shape: an unlabeled depth-0 opener with every
/// remaining line nested under it.
pub fn is_implicit_plan(lines: &[VoteLine]) -> bool {
    let Some((first, rest)) = lines.split_first() else {
        return false;
    };
    !rest.is_empty()
        && first.depth() == 0
        && classify_plan_label(first).is_none()
        && rest.iter().all(|line| line.depth() > 0)
}

/// The derived name of an implicit plan: its opening line's clean content.
pub fn implicit_plan_name(lines: &[VoteLine]) -> Option<String> {
    if is_implicit_plan(lines) {
        Some(lines[0].clean_content().to_string())
    } else {
        None
    }
}

/// Whether a block is a self-contained labeled definition, as opposed to a
/// loose implicit grouping.
pub fn is_content_block(block: &VoteLineBlock) -> bool {
    classify_plan_label(block.first()).is_some()
}

/// Strip one case-insensitive leading word, requiring a word boundary
/// (whitespace, a colon, or end of text) right after it.
fn strip_word<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let trimmed = text.trim_start();
    let mut chars = trimmed.char_indices();
    for expected in word.chars() {
        let (_, c) = chars.next()?;
        if !c.eq_ignore_ascii_case(&expected) {
            return None;
        }
    }
    let rest = chars.as_str();
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c == ':' || c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

/// The plan name following a matched label word, with its optional (or, for
/// Proposed, mandatory) colon removed.
fn label_name(rest: &str, require_colon: bool) -> Option<String> {
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix(':') {
        Some(after) => after,
        None if require_colon => return None,
        None => rest,
    };
    let name = rest.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
