//! Grouping votes that share leading lines into a display tree.

use std::fmt;

use crate::origin::Origin;
use crate::vote::block::VoteLineBlock;
use crate::vote::line::VoteLine;

/// One contributing vote, walked from a matched position.
#[derive(Clone, Copy)]
struct Contribution<'a> {
    block: &'a VoteLineBlock,
    voters: &'a [Origin],
    pos: usize,
}

impl<'a> Contribution<'a> {
    fn line(&self) -> &'a VoteLine {
        &self.block.lines()[self.pos]
    }
}

/// A node of the compaction forest: one matched line, the distinct voters
/// behind every vote containing it, and the grouped lines nested under it.
#[derive(Debug, Clone)]
pub struct CompactVote {
    line: VoteLine,
    voters: Vec<Origin>,
    children: Vec<CompactVote>,
}

impl CompactVote {
    /// The matched line; when duplicate occurrences tie, the shallowest.
    pub fn line(&self) -> &VoteLine {
        &self.line
    }

    pub fn voters(&self) -> &[Origin] {
        &self.voters
    }

    /// Distinct supporters across every vote matching this node.
    pub fn voter_count(&self) -> usize {
        self.voters.len()
    }

    pub fn children(&self) -> &[CompactVote] {
        &self.children
    }

    /// Pre-order depth-first walk over this node and everything below it.
    /// Each call returns a fresh iterator.
    pub fn flatten(&self) -> Flatten<'_> {
        Flatten { stack: vec![self] }
    }
}

impl fmt::Display for CompactVote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.voter_count(), self.line)
    }
}

/// Restartable pre-order iterator over a compaction subtree.
pub struct Flatten<'a> {
    stack: Vec<&'a CompactVote>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a CompactVote;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// Build the compaction forest from a storage snapshot.
///
/// Votes group by their first line (marker-blind). Within a node, every
/// line strictly deeper than the matched one (plus, at the root only,
/// later depth-0 continuations) becomes a child, deduplicated by line
/// equality. Children sort by descending voter count, then by line order.
pub fn build_compaction_tree(snapshot: &[(VoteLineBlock, Vec<Origin>)]) -> Vec<CompactVote> {
    let mut groups: Vec<Vec<Contribution<'_>>> = Vec::new();
    for (block, voters) in snapshot {
        let contribution = Contribution {
            block,
            voters,
            pos: 0,
        };
        match groups
            .iter_mut()
            .find(|group| group[0].line() == contribution.line())
        {
            Some(group) => group.push(contribution),
            None => groups.push(vec![contribution]),
        }
    }
    groups
        .into_iter()
        .map(|group| build_node(group, true))
        .collect()
}

fn build_node(contributions: Vec<Contribution<'_>>, is_root: bool) -> CompactVote {
    // grouping guarantees at least one contribution per node
    let mut line = contributions[0].line().clone();
    for contribution in &contributions[1..] {
        if contribution.line().depth() < line.depth() {
            line = contribution.line().clone();
        }
    }

    let mut voters: Vec<Origin> = Vec::new();
    for contribution in &contributions {
        for voter in contribution.voters {
            if !voters.contains(voter) {
                voters.push(voter.clone());
            }
        }
    }

    let mut child_groups: Vec<Vec<Contribution<'_>>> = Vec::new();
    for contribution in &contributions {
        let base_depth = contribution.line().depth();
        // one walk continuation per vote per child, at its first occurrence
        let mut claimed: Vec<usize> = Vec::new();
        for (pos, candidate) in contribution
            .block
            .lines()
            .iter()
            .enumerate()
            .skip(contribution.pos + 1)
        {
            let eligible = candidate.depth() > base_depth || (is_root && candidate.depth() == 0);
            if !eligible {
                continue;
            }
            let next = Contribution {
                block: contribution.block,
                voters: contribution.voters,
                pos,
            };
            match child_groups
                .iter()
                .position(|group| group[0].line() == candidate)
            {
                Some(idx) => {
                    if !claimed.contains(&idx) {
                        child_groups[idx].push(next);
                        claimed.push(idx);
                    }
                }
                None => {
                    child_groups.push(vec![next]);
                    claimed.push(child_groups.len() - 1);
                }
            }
        }
    }

    let mut children: Vec<CompactVote> = child_groups
        .into_iter()
        .map(|group| build_node(group, false))
        .collect();
    children.sort_by(|a, b| {
        b.voter_count()
            .cmp(&a.voter_count())
            .then_with(|| a.line.compare(&b.line))
    });

    CompactVote {
        line,
        voters,
        children,
    }
}
