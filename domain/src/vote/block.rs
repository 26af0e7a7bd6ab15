//! An ordered group of vote lines treated as one votable unit.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;
use crate::core::string::{agnostic_eq, agnostic_hash_into};
use crate::vote::line::{MarkerType, VoteLine};

/// A non-empty ordered sequence of [`VoteLine`]s with its own task and
/// marker, which may diverge from the first contained line's. Re-stamping a
/// block's marker or task never touches the children.
///
/// Blocks are the unit votes aggregate under: equality is the block task
/// plus pairwise line equality, the block marker never participates, and
/// the hash combines the lines in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteLineBlock {
    lines: Vec<VoteLine>,
    task: String,
    marker: String,
    marker_type: MarkerType,
    marker_value: u32,
}

impl VoteLineBlock {
    /// Build a block from lines, seeding task and marker from the first.
    ///
    /// # Errors
    /// [`DomainError::EmptyBlock`] when `lines` is empty. An empty block is
    /// a programmer error at the call site, never user input.
    pub fn new(lines: Vec<VoteLine>) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::EmptyBlock);
        }
        Ok(Self::from_nonempty(lines))
    }

    /// Single-line block; infallible.
    pub fn from_line(line: VoteLine) -> Self {
        Self::from_nonempty(vec![line])
    }

    pub(crate) fn from_nonempty(lines: Vec<VoteLine>) -> Self {
        let first = &lines[0];
        let task = first.task().to_string();
        let marker = first.marker().to_string();
        let marker_type = first.marker_type();
        let marker_value = first.marker_value();
        Self {
            lines,
            task,
            marker,
            marker_type,
            marker_value,
        }
    }

    pub fn lines(&self) -> &[VoteLine] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VoteLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Blocks are non-empty by construction.
    pub fn first(&self) -> &VoteLine {
        &self.lines[0]
    }

    pub fn task(&self) -> &str {
        &self.task
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

    /// Re-stamp the block-level task, leaving every line untouched.
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    /// Re-stamp the block-level marker, leaving every line untouched.
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

    /// The canonical aggregation key: same lines, marker forced to None.
    pub fn canonical(&self) -> Self {
        self.clone().with_marker("", MarkerType::None, 0)
    }

    /// The lines with the block-level marker (and task, when set) stamped
    /// onto the first line. Used when a block dissolves back into lines.
    pub fn lines_restamped(&self) -> Vec<VoteLine> {
        let mut out = self.lines.clone();
        if let Some(first) = out.first_mut() {
            let mut line = first.clone().with_marker(
                self.marker.clone(),
                self.marker_type,
                self.marker_value,
            );
            if !self.task.is_empty() {
                line = line.with_task(self.task.clone());
            }
            *first = line;
        }
        out
    }

    /// Compare against a bare line sequence.
    ///
    /// Lines match pairwise as usual; a block whose MarkerType is None or
    /// Plan acts as a wildcard accepting any markers, while other blocks
    /// also require their marker type on the sequence's first line.
    pub fn matches_lines(&self, lines: &[VoteLine]) -> bool {
        if self.lines.len() != lines.len() {
            return false;
        }
        if self.lines.iter().zip(lines.iter()).any(|(a, b)| a != b) {
            return false;
        }
        match self.marker_type {
            MarkerType::None | MarkerType::Plan => true,
            other => lines
                .first()
                .is_some_and(|first| first.marker_type() == other),
        }
    }

    /// Marker-blind textual form, one comparable line per row.
    pub fn to_comparable_string(&self) -> String {
        self.lines
            .iter()
            .map(VoteLine::to_comparable_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PartialEq for VoteLineBlock {
    fn eq(&self, other: &Self) -> bool {
        if !agnostic_eq(&self.task, &other.task) {
            return false;
        }
        // pairwise up to the shorter length, then the counts must agree
        if self.lines.iter().zip(other.lines.iter()).any(|(a, b)| a != b) {
            return false;
        }
        self.lines.len() == other.lines.len()
    }
}

impl Eq for VoteLineBlock {}

impl Hash for VoteLineBlock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        agnostic_hash_into(&self.task, state);
        for line in &self.lines {
            line.hash(state);
        }
    }
}

impl<'a> IntoIterator for &'a VoteLineBlock {
    type Item = &'a VoteLine;
    type IntoIter = std::slice::Iter<'a, VoteLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

impl fmt::Display for VoteLineBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for line in self.lines_restamped() {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::lexer::parse_line;
    use std::hash::DefaultHasher;

    fn line(text: &str) -> VoteLine {
        parse_line(text).expect("vote line")
    }

    fn block(texts: &[&str]) -> VoteLineBlock {
        VoteLineBlock::new(texts.iter().map(|t| line(t)).collect()).expect("non-empty")
    }

    fn hash_of(b: &VoteLineBlock) -> u64 {
        let mut hasher = DefaultHasher::new();
        b.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_empty_block_is_rejected() {
        let err = VoteLineBlock::new(Vec::new()).unwrap_err();
        assert!(err.is_empty_block());
    }

    #[test]
    fn test_block_seeds_metadata_from_first_line() {
        let b = block(&["[x][Movie] A", "-[x] B"]);
        assert_eq!(b.task(), "Movie");
        assert_eq!(b.marker_type(), MarkerType::Vote);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_equality_is_pairwise_and_count() {
        let a = block(&["[x] One", "-[x] Two"]);
        let b = block(&["[✓] ONE", "-[#2] two"]);
        assert_eq!(a, b);

        let longer = block(&["[x] One", "-[x] Two", "-[x] Three"]);
        assert_ne!(a, longer);

        let reordered = block(&["-[x] Two", "[x] One"]);
        assert_ne!(a, reordered);
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        let forward = block(&["[x] One", "[x] Two"]);
        let backward = block(&["[x] Two", "[x] One"]);
        assert_ne!(hash_of(&forward), hash_of(&backward));
        assert_eq!(
            hash_of(&forward),
            hash_of(&block(&["[100%] one!", "[x] TWO"]))
        );
    }

    #[test]
    fn test_restamping_leaves_children_alone() {
        let b = block(&["[x][Movie] A", "-[x][Snack] B"]).with_task("Evening");
        assert_eq!(b.task(), "Evening");
        assert_eq!(b.lines()[0].task(), "Movie");
        assert_eq!(b.lines()[1].task(), "Snack");

        let restamped = b.lines_restamped();
        assert_eq!(restamped[0].task(), "Evening");
        assert_eq!(restamped[1].task(), "Snack");
    }

    #[test]
    fn test_canonical_strips_marker() {
        let b = block(&["[x] Run Lola Run!"]);
        let canonical = b.canonical();
        assert_eq!(canonical.marker_type(), MarkerType::None);
        assert_eq!(canonical, b);
        assert_eq!(hash_of(&canonical), hash_of(&b));
    }

    #[test]
    fn test_comparable_string() {
        let b = block(&["[X] Run Lola Run!"]);
        assert_eq!(b.to_comparable_string(), "[] Run Lola Run!");
    }

    #[test]
    fn test_matches_lines_wildcard_markers() {
        let plan = block(&["[x] Plan: Alpha", "-[x] Body"])
            .with_marker("", MarkerType::Plan, 0);
        let voted = [line("[1] plan: alpha"), line("-[1] body")];
        assert!(plan.matches_lines(&voted));

        let strict = block(&["[x] Plan: Alpha", "-[x] Body"]);
        assert!(strict.matches_lines(&[line("[x] Plan: Alpha"), line("-[x] Body")]));
        assert!(!strict.matches_lines(&[line("[+] Plan: Alpha"), line("-[x] Body")]));

        assert!(!plan.matches_lines(&voted[..1]));
    }
}
