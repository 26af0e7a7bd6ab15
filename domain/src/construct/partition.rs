//! Phase 3: partitioning a working vote into canonical blocks.

use crate::index::VoteIndex;
use crate::post::{Post, WorkingVoteEntry};
use crate::quest::{PartitionMode, PlanBodyMode, Quest};
use crate::vote::block::VoteLineBlock;
use crate::vote::blocks::{classify_plan_label, is_content_block, split_into_blocks};
use crate::vote::line::{MarkerType, VoteLine};

/// Emit a post's canonical votes, at most once.
///
/// Returns `None` when nothing happened: the post is already processed or
/// its working vote was never completed. Returns `Some` exactly when the
/// post transitions to processed, with an empty list if a strictly newer
/// vote by the same author has already superseded it.
pub fn emit_canonical_votes(
    post: &mut Post,
    quest: &Quest,
    index: &dyn VoteIndex,
) -> Option<Vec<VoteLineBlock>> {
    if post.processed() || !post.working_vote_complete() {
        return None;
    }
    if index.has_newer_vote(post) {
        post.mark_processed();
        return Some(Vec::new());
    }
    let mut blocks = partition(post.working_vote(), quest.partition_mode());
    blocks.retain(|block| quest.task_filter().allows(block.task()));
    post.mark_processed();
    Some(blocks)
}

/// Split a working vote into blocks under one partition mode.
pub fn partition(entries: &[WorkingVoteEntry], mode: PartitionMode) -> Vec<VoteLineBlock> {
    match mode {
        PartitionMode::None => partition_whole(entries),
        PartitionMode::ByLine => partition_by_line(entries, false),
        PartitionMode::ByLineTask => partition_by_line(entries, true),
        PartitionMode::ByBlock => partition_by_block(entries),
    }
}

/// Extract the partitions a referenced plan body contributes.
pub fn partition_plan_body(block: &VoteLineBlock, mode: PlanBodyMode) -> Vec<VoteLineBlock> {
    match mode {
        PlanBodyMode::ByLine => promote_to_min_depth(block.lines_restamped())
            .into_iter()
            .map(VoteLineBlock::from_line)
            .collect(),
        PlanBodyMode::ByBlock => {
            if is_content_block(block) {
                vec![block.clone()]
            } else {
                partition_plan_body(block, PlanBodyMode::ByBlockAll)
            }
        }
        PlanBodyMode::ByBlockAll => {
            split_into_blocks(promote_to_min_depth(block.lines_restamped()))
        }
    }
}

/// Canonicalize a plan definition: Base/Proposed labels become `Plan: X`
/// and every line's marker is stripped, so a later literal reinsertion of
/// the same plan compares and hashes identically regardless of phrasing.
pub fn normalize_plan(block: &VoteLineBlock) -> VoteLineBlock {
    let mut lines: Vec<VoteLine> = block
        .lines()
        .iter()
        .map(|line| line.clone().with_marker("", MarkerType::None, 0))
        .collect();
    if let Some((_, name)) = classify_plan_label(block.first()) {
        lines[0] = lines[0].clone().with_content(format!("Plan: {name}"));
    }
    VoteLineBlock::from_nonempty(lines)
}

fn partition_whole(entries: &[WorkingVoteEntry]) -> Vec<VoteLineBlock> {
    let mut lines = Vec::new();
    for entry in entries {
        match entry {
            WorkingVoteEntry::Line(line) => lines.push(line.clone()),
            WorkingVoteEntry::Block(block) => lines.extend(block.lines_restamped()),
        }
    }
    VoteLineBlock::new(lines).ok().into_iter().collect()
}

fn partition_by_line(entries: &[WorkingVoteEntry], with_tasks: bool) -> Vec<VoteLineBlock> {
    let mut out = Vec::new();
    let mut cascade = TaskCascade::default();
    for entry in entries {
        match entry {
            WorkingVoteEntry::Line(line) => {
                let line = if with_tasks {
                    cascade.apply(line.clone())
                } else {
                    line.clone()
                };
                out.push(VoteLineBlock::from_line(line));
            }
            WorkingVoteEntry::Block(block) => {
                cascade.reset();
                for piece in partition_plan_body(block, PlanBodyMode::ByLine) {
                    for line in piece.lines_restamped() {
                        let line = if with_tasks { cascade.apply(line) } else { line };
                        out.push(VoteLineBlock::from_line(line));
                    }
                }
                cascade.reset();
            }
        }
    }
    out
}

fn partition_by_block(entries: &[WorkingVoteEntry]) -> Vec<VoteLineBlock> {
    let mut out = Vec::new();
    let mut current: Vec<VoteLine> = Vec::new();
    for entry in entries {
        match entry {
            WorkingVoteEntry::Line(line) => {
                if line.depth() == 0 && !current.is_empty() {
                    out.push(VoteLineBlock::from_nonempty(std::mem::take(&mut current)));
                }
                current.push(line.clone());
            }
            WorkingVoteEntry::Block(block) => {
                if !current.is_empty() {
                    out.push(VoteLineBlock::from_nonempty(std::mem::take(&mut current)));
                }
                out.extend(partition_plan_body(block, PlanBodyMode::ByBlock));
            }
        }
    }
    if !current.is_empty() {
        out.push(VoteLineBlock::from_nonempty(current));
    }
    out
}

fn promote_to_min_depth(lines: Vec<VoteLine>) -> Vec<VoteLine> {
    let min = lines.iter().map(VoteLine::depth).min().unwrap_or(0);
    if min == 0 {
        return lines;
    }
    lines.into_iter().map(|line| line.promote(min)).collect()
}

/// Task inheritance for ByLineTask: a line without a task takes the one
/// declared by its nearest shallower-or-equal-depth ancestor. The stack is
/// owned by a single partitioning call and resets at embedded blocks.
#[derive(Default)]
struct TaskCascade {
    stack: Vec<(usize, String)>,
}

impl TaskCascade {
    fn apply(&mut self, line: VoteLine) -> VoteLine {
        let depth = line.depth();
        while self.stack.last().is_some_and(|(d, _)| *d > depth) {
            self.stack.pop();
        }
        if !line.task().is_empty() {
            match self.stack.last_mut() {
                Some((d, task)) if *d == depth => *task = line.task().to_string(),
                _ => self.stack.push((depth, line.task().to_string())),
            }
            line
        } else if let Some((_, task)) = self.stack.last() {
            line.with_task(task.clone())
        } else {
            line
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::testing::FakeIndex;
    use crate::origin::Origin;
    use crate::vote::lexer::parse_line;

    fn line(text: &str) -> VoteLine {
        parse_line(text).expect("vote line")
    }

    fn entries(texts: &[&str]) -> Vec<WorkingVoteEntry> {
        texts
            .iter()
            .map(|t| WorkingVoteEntry::Line(line(t)))
            .collect()
    }

    fn block(texts: &[&str]) -> VoteLineBlock {
        VoteLineBlock::new(texts.iter().map(|t| line(t)).collect()).expect("non-empty")
    }

    #[test]
    fn test_single_line_is_one_partition_under_every_mode() {
        let vote = entries(&["[X] Run Lola Run!"]);
        for mode in [
            PartitionMode::None,
            PartitionMode::ByLine,
            PartitionMode::ByBlock,
        ] {
            let parts = partition(&vote, mode);
            assert_eq!(parts.len(), 1, "{mode}");
            assert_eq!(parts[0].to_comparable_string(), "[] Run Lola Run!");
        }
    }

    #[test]
    fn test_parent_and_child_partitioning() {
        let vote = entries(&["[X][Movie] A", "-[X] B"]);

        assert_eq!(partition(&vote, PartitionMode::None).len(), 1);
        assert_eq!(partition(&vote, PartitionMode::ByBlock).len(), 1);

        let by_line = partition(&vote, PartitionMode::ByLine);
        assert_eq!(by_line.len(), 2);
        assert_eq!(by_line[1].task(), "");

        let by_task = partition(&vote, PartitionMode::ByLineTask);
        assert_eq!(by_task.len(), 2);
        assert_eq!(by_task[0].task(), "Movie");
        assert_eq!(by_task[1].task(), "Movie");
    }

    #[test]
    fn test_task_cascade_pops_on_shallower_lines() {
        let vote = entries(&[
            "[x][Movie] A",
            "-[x][Snack] B",
            "--[x] C",
            "-[x] D",
            "[x] E",
        ]);
        let parts = partition(&vote, PartitionMode::ByLineTask);
        let tasks: Vec<&str> = parts.iter().map(|p| p.task()).collect();
        assert_eq!(tasks, vec!["Movie", "Snack", "Snack", "Movie", ""]);
    }

    #[test]
    fn test_task_cascade_resets_at_embedded_blocks() {
        let plan = block(&["[x] Plan: Ambush", "-[x][West] Strike", "-[x] Quietly"]);
        let vote = vec![
            WorkingVoteEntry::Line(line("[x][Main] Go")),
            WorkingVoteEntry::Block(plan),
            WorkingVoteEntry::Line(line("-[x] Afterwards")),
        ];
        let parts = partition(&vote, PartitionMode::ByLineTask);
        let tasks: Vec<&str> = parts.iter().map(|p| p.task()).collect();
        // plan lines never inherit "Main", and the trailing line never
        // inherits "West" from inside the plan
        assert_eq!(tasks, vec!["Main", "", "West", "West", ""]);
    }

    #[test]
    fn test_by_block_keeps_labeled_plans_whole() {
        let plan = block(&["[x] Plan: Ambush", "-[x] Strike", "-[x] Quietly"]);
        let vote = vec![
            WorkingVoteEntry::Line(line("[x] Tea")),
            WorkingVoteEntry::Block(plan),
            WorkingVoteEntry::Line(line("[x] Cake")),
        ];
        let parts = partition(&vote, PartitionMode::ByBlock);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 3);
    }

    #[test]
    fn test_by_block_resplits_unlabeled_blocks() {
        let unlabeled = block(&["[x] First", "-[x] Detail", "[x] Second"]);
        let parts = partition(
            &[WorkingVoteEntry::Block(unlabeled)],
            PartitionMode::ByBlock,
        );
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 1);
    }

    #[test]
    fn test_plan_body_by_line_promotes_to_min_depth() {
        let body = block(&["-[x] Strike", "--[x] Quietly"]);
        let parts = partition_plan_body(&body, PlanBodyMode::ByLine);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].first().depth(), 0);
        assert_eq!(parts[1].first().depth(), 1);
    }

    #[test]
    fn test_plan_body_by_block_all_always_resplits() {
        let labeled = block(&["[x] Plan: Ambush", "-[x] Strike", "[x] Retreat"]);
        assert_eq!(partition_plan_body(&labeled, PlanBodyMode::ByBlock).len(), 1);
        let resplit = partition_plan_body(&labeled, PlanBodyMode::ByBlockAll);
        assert_eq!(resplit.len(), 2);
    }

    #[test]
    fn test_normalize_plan_rewrites_label_and_strips_markers() {
        let proposed = block(&["[x] Proposed Plan: Ambush", "-[1] Strike"]);
        let normalized = normalize_plan(&proposed);
        assert_eq!(normalized.first().clean_content(), "Plan: Ambush");
        assert!(normalized
            .lines()
            .iter()
            .all(|l| l.marker_type() == MarkerType::None));

        let explicit = block(&["[x] plan:Ambush", "-[x] Strike"]);
        assert_eq!(
            normalize_plan(&explicit).first().clean_content(),
            "Plan: Ambush"
        );
    }

    #[test]
    fn test_emit_runs_at_most_once() {
        let mut post = Post::new(Origin::user("Alice").with_post(10, 1), "[x] Tea");
        let quest = Quest::new("q");
        let index = FakeIndex::new();

        // phase 2 never ran
        assert!(emit_canonical_votes(&mut post, &quest, &index).is_none());

        crate::construct::build_working_vote(&mut post, &quest, &index);
        let blocks = emit_canonical_votes(&mut post, &quest, &index).unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(post.processed());

        assert!(emit_canonical_votes(&mut post, &quest, &index).is_none());
    }

    #[test]
    fn test_superseded_post_processes_with_no_output() {
        let quest = Quest::new("q");
        let mut newer = Post::new(Origin::user("Alice").with_post(30, 3), "[x] Pie");
        crate::construct::build_working_vote(&mut newer, &quest, &FakeIndex::new());
        newer.mark_processed();
        let index = FakeIndex::new().with_post(newer);

        let mut stale = Post::new(Origin::user("Alice").with_post(10, 1), "[x] Tea");
        crate::construct::build_working_vote(&mut stale, &quest, &index);
        let blocks = emit_canonical_votes(&mut stale, &quest, &index).unwrap();
        assert!(blocks.is_empty());
        assert!(stale.processed());
    }

    #[test]
    fn test_task_filter_drops_partitions() {
        let quest = Quest::new("q")
            .with_partition_mode(PartitionMode::ByLine)
            .with_task_filter(crate::quest::TaskFilter::new(vec!["Movie".to_string()]));
        let mut post = Post::new(
            Origin::user("Alice").with_post(10, 1),
            "[x][Movie] A\n[x][Snack] B",
        );
        crate::construct::build_working_vote(&mut post, &quest, &FakeIndex::new());
        let blocks = emit_canonical_votes(&mut post, &quest, &FakeIndex::new()).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].task(), "Movie");
    }
}
