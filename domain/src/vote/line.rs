//! The atomic unit of a vote.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::string::{agnostic_cmp, agnostic_eq, agnostic_hash_into};
use crate::vote::lexer::strip_bb_code;
use crate::vote::trim::trim_extended_content;

/// How a vote line (or block) was marked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    /// No marker; also the canonical form votes aggregate under.
    #[default]
    None,
    /// `[x]` and check/box glyphs.
    Vote,
    /// `[#N]` / `[N]` ranked position.
    Rank,
    /// `[N%]` score.
    Score,
    /// `[+]` / `[-]`.
    Approval,
    /// Stamped onto normalized plan blocks.
    Plan,
}

impl MarkerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerType::None => "none",
            MarkerType::Vote => "vote",
            MarkerType::Rank => "rank",
            MarkerType::Score => "score",
            MarkerType::Approval => "approval",
            MarkerType::Plan => "plan",
        }
    }
}

impl fmt::Display for MarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single marked line of a vote.
///
/// Immutable; every modifier returns a new value. Two lines are equal when
/// their clean content and task match agnostically. The marker and the
/// depth never participate, so `[X] A basic vote line` and
/// `[100%] A  basicvoteline` are the same line as far as tallying cares.
///
/// # Example
/// ```
/// use tally_domain::vote::lexer::parse_line;
///
/// let a = parse_line("[X] A basic vote line").unwrap();
/// let b = parse_line("[100%] A  basicvoteline").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteLine {
    prefix: String,
    marker: String,
    marker_type: MarkerType,
    marker_value: u32,
    task: String,
    content: String,
    clean_content: String,
}

impl VoteLine {
    /// Build a line from already-lexed pieces. Clean content is derived.
    pub fn new(
        prefix: impl Into<String>,
        marker: impl Into<String>,
        marker_type: MarkerType,
        marker_value: u32,
        task: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let clean_content = strip_bb_code(&content).trim().to_string();
        Self {
            prefix: prefix.into(),
            marker: marker.into(),
            marker_type,
            marker_value,
            task: task.into(),
            content,
            clean_content,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Nesting depth, always recomputed from the prefix.
    pub fn depth(&self) -> usize {
        self.prefix.chars().count()
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn marker_type(&self) -> MarkerType {
        self.marker_type
    }

    pub fn marker_value(&self) -> u32 {
        self.marker_value
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content with markup sentinels stripped; the comparison text.
    pub fn clean_content(&self) -> &str {
        &self.clean_content
    }

    /// Strip up to `n` leading prefix characters, clamped to the valid range.
    pub fn promote(mut self, n: usize) -> Self {
        let keep = self.depth().saturating_sub(n);
        self.prefix = self
            .prefix
            .chars()
            .skip(self.prefix.chars().count() - keep)
            .collect();
        self
    }

    /// Replace the prefix with `n` plain dashes.
    pub fn with_prefix_depth(mut self, n: usize) -> Self {
        self.prefix = "-".repeat(n);
        self
    }

    /// Re-stamp the marker.
    pub fn with_marker(
        mut self,
        marker: impl Into<String>,
        marker_type: MarkerType,
        marker_value: u32,
    ) -> Self {
        self.marker = marker.into();
        self.marker_type = marker_type;
        self.marker_value = marker_value;
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self.clean_content = strip_bb_code(&self.content).trim().to_string();
        self
    }

    /// Shorten an over-long line to its leading description.
    ///
    /// Applies only when the clean content is 50+ characters; see
    /// [`crate::vote::trim`] for the separator heuristics.
    pub fn with_trimmed_content(self) -> Self {
        match trim_extended_content(&self.clean_content) {
            Some(trimmed) => self.with_content(trimmed),
            None => self,
        }
    }

    /// Marker-blind textual form of what the line means for comparison.
    pub fn to_comparable_string(&self) -> String {
        if self.task.is_empty() {
            format!("{}[] {}", self.prefix, self.clean_content)
        } else {
            format!("{}[][{}] {}", self.prefix, self.task, self.clean_content)
        }
    }

    /// Deterministic report ordering: agnostic content, then agnostic task,
    /// with deeper lines sorting first on full ties.
    ///
    /// Not an `Ord` impl: it disagrees with the marker-blind `Eq` on depth,
    /// which the `Ord` contract does not allow.
    pub fn compare(&self, other: &Self) -> Ordering {
        agnostic_cmp(&self.clean_content, &other.clean_content)
            .then_with(|| agnostic_cmp(&self.task, &other.task))
            .then_with(|| other.depth().cmp(&self.depth()))
    }
}

impl PartialEq for VoteLine {
    fn eq(&self, other: &Self) -> bool {
        agnostic_eq(&self.clean_content, &other.clean_content)
            && agnostic_eq(&self.task, &other.task)
    }
}

impl Eq for VoteLine {}

impl Hash for VoteLine {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // solely the agnostic content; equal lines must collide, and task
        // comparison is cheap enough to leave to Eq
        agnostic_hash_into(&self.clean_content, state);
    }
}

impl fmt::Display for VoteLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.prefix, self.marker)?;
        if !self.task.is_empty() {
            write!(f, "[{}]", self.task)?;
        }
        write!(f, " {}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::string::agnostic_hash;
    use crate::vote::lexer::parse_line;

    fn line(text: &str) -> VoteLine {
        parse_line(text).expect("vote line")
    }

    #[test]
    fn test_equality_is_marker_and_spacing_blind() {
        let a = line("[X] A basic vote line");
        let b = line("[x] A  basicvoteline");
        let c = line("[100%] A basic vote line");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(
            agnostic_hash(a.clean_content()),
            agnostic_hash(b.clean_content())
        );
    }

    #[test]
    fn test_equality_respects_task() {
        let plain = line("[x] Go west");
        let tasked = line("[x][Travel] Go west");
        assert_ne!(plain, tasked);
        assert_eq!(tasked, line("[1][travel] GO WEST"));
    }

    #[test]
    fn test_equality_ignores_depth() {
        assert_eq!(line("[x] Go west"), line("--[x] Go west"));
    }

    #[test]
    fn test_depth_recomputed_from_prefix() {
        let deep = line("--[x] deep");
        assert_eq!(deep.depth(), 2);
        assert_eq!(deep.clone().promote(1).depth(), 1);
        assert_eq!(deep.clone().promote(5).depth(), 0);
        assert_eq!(deep.with_prefix_depth(4).depth(), 4);
    }

    #[test]
    fn test_with_marker_keeps_identity() {
        let original = line("[x] Take the sword");
        let restamped = original
            .clone()
            .with_marker("#1", MarkerType::Rank, 1);
        assert_eq!(original, restamped);
        assert_eq!(restamped.marker_value(), 1);
    }

    #[test]
    fn test_comparable_string() {
        assert_eq!(
            line("[X] Run Lola Run!").to_comparable_string(),
            "[] Run Lola Run!"
        );
        assert_eq!(
            line("-[x][Movie] B").to_comparable_string(),
            "-[][Movie] B"
        );
    }

    #[test]
    fn test_compare_breaks_ties_deeper_first() {
        let shallow = line("[x] Same text");
        let deep = line("--[x] Same text");
        assert_eq!(shallow.compare(&deep), Ordering::Greater);
        assert_eq!(deep.compare(&shallow), Ordering::Less);
        assert_eq!(shallow.compare(&shallow.clone()), Ordering::Equal);
    }

    #[test]
    fn test_clean_content_strips_markup() {
        let styled = line("[x] a 『b』bold『/b』 choice");
        assert_eq!(styled.content(), "a 『b』bold『/b』 choice");
        assert_eq!(styled.clean_content(), "a bold choice");
        assert_eq!(styled, line("[x] a bold choice"));
    }
}
