//! Phase 2: resolving plan and proxy references into a working vote.
//!
//! A short vote line can point at someone else's content instead of stating
//! it: `[x] Plan: Ambush`, `[x] Alice`, `[x] ^Alice` (pinned). Resolution
//! never fails hard: an unresolvable line stays literal text, and a
//! reference to a not-yet-processed vote defers the whole post so the
//! caller can retry it after its target.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::string::agnostic_eq;
use crate::index::{StoredPlan, VoteIndex};
use crate::post::{Post, WorkingVoteEntry};
use crate::quest::Quest;
use crate::vote::block::VoteLineBlock;
use crate::vote::blocks::{is_base_plan, split_into_blocks, PlanLabelKind};
use crate::vote::line::VoteLine;

/// Longest clean content that can still be a reference.
const MAX_REFERENCE_LEN: usize = 100;

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?P<pin>[\^↑])?\s*(?:(?P<label>base\s+plan|proposed\s+plan|plan)\s*:\s*|(?P<label_word>base\s+plan|proposed\s+plan|plan)\s+)?(?P<name>\S.*?)[\s.]*$",
    )
    .expect("reference grammar")
});

/// Outcome of a working-vote build attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingVoteOutcome {
    /// The working vote is installed on the post.
    Complete,
    /// A proxy target is not processed yet; retry this post later.
    Deferred,
}

/// A parsed reference candidate. Whether it actually refers to anything is
/// decided against the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reference {
    pub pinned: bool,
    pub label: Option<PlanLabelKind>,
    pub name: String,
}

enum Resolution {
    /// Substitute a plan's block, consuming `consumed` pasted body lines.
    Plan {
        block: VoteLineBlock,
        consumed: usize,
    },
    /// Inline the target voter's resolved entries.
    Voter(Vec<WorkingVoteEntry>),
    /// Target exists but is not processed yet.
    Defer,
    /// Not a reference after all.
    Literal,
}

/// Build the post's working vote, resolving references against the index.
///
/// Idempotent: a post whose working vote is already complete is left
/// untouched. The post's own Base/Proposed Plan blocks are skipped, since
/// a proposal is not a vote for itself. Returns `Deferred` without
/// touching the post when any proxy target is still unprocessed.
pub fn build_working_vote(
    post: &mut Post,
    quest: &Quest,
    index: &dyn VoteIndex,
) -> WorkingVoteOutcome {
    if post.working_vote_complete() {
        return WorkingVoteOutcome::Complete;
    }

    let mut entries: Vec<WorkingVoteEntry> = Vec::new();
    for block in split_into_blocks(post.vote_lines().to_vec()) {
        if is_base_plan(&block) {
            continue;
        }
        let lines = block.lines();
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            let mut end = i + 1;
            while end < lines.len() && lines[end].depth() > line.depth() {
                end += 1;
            }
            match resolve_line(line, &lines[i + 1..end], post, quest, index) {
                Resolution::Plan { block, consumed } => {
                    entries.push(WorkingVoteEntry::Block(block));
                    i += 1 + consumed;
                }
                Resolution::Voter(substituted) => {
                    entries.extend(substituted);
                    i += 1;
                }
                Resolution::Defer => return WorkingVoteOutcome::Deferred,
                Resolution::Literal => {
                    entries.push(WorkingVoteEntry::Line(literal_line(line, quest)));
                    i += 1;
                }
            }
        }
    }
    post.set_working_vote(entries);
    WorkingVoteOutcome::Complete
}

/// Parse a line as a reference candidate. Long lines are never references.
pub(crate) fn parse_reference(line: &VoteLine) -> Option<Reference> {
    let content = line.clean_content();
    if content.chars().count() > MAX_REFERENCE_LEN {
        return None;
    }
    let caps = REFERENCE_RE.captures(content)?;
    let name = caps.name("name")?.as_str().to_string();
    let label = caps
        .name("label")
        .or_else(|| caps.name("label_word"))
        .map(|m| {
            let text = m.as_str().to_ascii_lowercase();
            if text.starts_with("base") {
                PlanLabelKind::BasePlan
            } else if text.starts_with("proposed") {
                PlanLabelKind::ProposedPlan
            } else {
                PlanLabelKind::Plan
            }
        });
    Some(Reference {
        pinned: caps.name("pin").is_some(),
        label,
        name,
    })
}

fn resolve_line(
    line: &VoteLine,
    attached: &[VoteLine],
    post: &Post,
    quest: &Quest,
    index: &dyn VoteIndex,
) -> Resolution {
    let Some(reference) = parse_reference(line) else {
        return Resolution::Literal;
    };

    // a pin always means a voter proxy
    if reference.pinned {
        return resolve_voter(&reference.name, post, quest, true, index)
            .unwrap_or(Resolution::Literal);
    }

    match reference.label {
        Some(PlanLabelKind::BasePlan | PlanLabelKind::ProposedPlan) => {
            resolve_plan(&reference.name, line, attached, index).unwrap_or(Resolution::Literal)
        }
        Some(PlanLabelKind::Plan) => {
            if let Some(resolution) = resolve_plan(&reference.name, line, attached, index) {
                return resolution;
            }
            resolve_voter(&reference.name, post, quest, false, index)
                .unwrap_or(Resolution::Literal)
        }
        None => {
            if let Some(resolution) = resolve_voter(&reference.name, post, quest, false, index) {
                return resolution;
            }
            if !quest.force_plan_references_labeled() {
                if let Some(resolution) = resolve_plan(&reference.name, line, attached, index) {
                    return resolution;
                }
            }
            Resolution::Literal
        }
    }
}

/// Resolve against a registered plan. `None` means no such plan; the
/// caller may fall back. A body pasted under the reference must reproduce
/// the plan exactly; a partial match is plain text, never a reference.
fn resolve_plan(
    name: &str,
    line: &VoteLine,
    attached: &[VoteLine],
    index: &dyn VoteIndex,
) -> Option<Resolution> {
    let plan = index.reference_plan(name)?;
    let body = plan.block.lines().get(1..).unwrap_or(&[]);
    if attached.is_empty() {
        return Some(substitute_plan(plan, line, 0));
    }
    if attached.len() == body.len() && attached.iter().zip(body).all(|(a, b)| a == b) {
        return Some(substitute_plan(plan, line, attached.len()));
    }
    Some(Resolution::Literal)
}

fn substitute_plan(plan: &StoredPlan, line: &VoteLine, consumed: usize) -> Resolution {
    let mut block = plan.block.clone().with_marker(
        line.marker().to_string(),
        line.marker_type(),
        line.marker_value(),
    );
    if !line.task().is_empty() {
        block = block.with_task(line.task().to_string());
    }
    Resolution::Plan { block, consumed }
}

/// Resolve against another voter's vote. `None` means the name is not a
/// usable proxy target; the caller may fall back.
fn resolve_voter(
    name: &str,
    post: &Post,
    quest: &Quest,
    pinned: bool,
    index: &dyn VoteIndex,
) -> Option<Resolution> {
    if quest.disable_proxy_votes() {
        return None;
    }
    if agnostic_eq(name, post.author()) {
        return None;
    }
    if !index.has_voter(name) {
        return None;
    }
    let pinned = pinned || quest.force_pinned_proxy_votes();
    let ceiling = pinned.then(|| post.origin().post_id());
    let target = index.last_post_by_author(name, ceiling)?;
    if target.processed() {
        return Some(Resolution::Voter(target.working_vote().to_vec()));
    }
    if post.force_process() {
        // salvage pass: settle for the target's last processed state
        let votes = index.votes_by(name);
        if votes.is_empty() {
            return None;
        }
        return Some(Resolution::Voter(
            votes.into_iter().map(WorkingVoteEntry::Block).collect(),
        ));
    }
    Some(Resolution::Defer)
}

fn literal_line(line: &VoteLine, quest: &Quest) -> VoteLine {
    if quest.trim_extended_text() {
        line.clone().with_trimmed_content()
    } else {
        line.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::normalize_plan;
    use crate::construct::testing::FakeIndex;
    use crate::origin::Origin;
    use crate::vote::lexer::parse_line;
    use crate::vote::line::MarkerType;

    fn line(text: &str) -> VoteLine {
        parse_line(text).expect("vote line")
    }

    fn post_at(author: &str, post_id: u64, text: &str) -> Post {
        Post::new(Origin::user(author).with_post(post_id, post_id as u32), text)
    }

    fn stored_plan(name: &str, texts: &[&str]) -> StoredPlan {
        let block = VoteLineBlock::new(texts.iter().map(|t| line(t)).collect()).expect("plan");
        StoredPlan::new(Origin::plan(name), normalize_plan(&block))
    }

    #[test]
    fn test_parse_reference_grammar() {
        let r = parse_reference(&line("[x] ^Alice")).unwrap();
        assert!(r.pinned);
        assert_eq!(r.label, None);
        assert_eq!(r.name, "Alice");

        let r = parse_reference(&line("[x] Plan: Ambush at dawn.")).unwrap();
        assert!(!r.pinned);
        assert_eq!(r.label, Some(PlanLabelKind::Plan));
        assert_eq!(r.name, "Ambush at dawn");

        let r = parse_reference(&line("[x] base plan Caution")).unwrap();
        assert_eq!(r.label, Some(PlanLabelKind::BasePlan));
        assert_eq!(r.name, "Caution");

        let r = parse_reference(&line("[x] Planetary defense")).unwrap();
        assert_eq!(r.label, None);
        assert_eq!(r.name, "Planetary defense");

        let long = format!("[x] {}", "word ".repeat(30));
        assert!(parse_reference(&line(&long)).is_none());
    }

    #[test]
    fn test_plan_reference_substitutes_restamped_block() {
        let index = FakeIndex::new().with_plan(stored_plan(
            "Ambush",
            &["[x] Plan: Ambush", "-[x] Strike from the west"],
        ));
        let mut post = post_at("Bob", 20, "[1][Battle] Plan: Ambush");
        let outcome = build_working_vote(&mut post, &Quest::new("q"), &index);
        assert_eq!(outcome, WorkingVoteOutcome::Complete);

        let entries = post.working_vote();
        assert_eq!(entries.len(), 1);
        let block = entries[0].as_block().unwrap();
        assert_eq!(block.marker_type(), MarkerType::Rank);
        assert_eq!(block.task(), "Battle");
        assert_eq!(block.lines()[1].clean_content(), "Strike from the west");
    }

    #[test]
    fn test_pasted_plan_body_is_consumed() {
        let index = FakeIndex::new().with_plan(stored_plan(
            "Ambush",
            &["[x] Plan: Ambush", "-[x] Strike from the west", "-[x] At dawn"],
        ));
        let mut post = post_at(
            "Bob",
            20,
            "[x] Plan: Ambush\n-[x] Strike from the west\n-[x] At dawn\n[x] And breakfast after",
        );
        build_working_vote(&mut post, &Quest::new("q"), &index);

        let entries = post.working_vote();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].as_block().is_some());
        assert_eq!(
            entries[1].as_line().unwrap().clean_content(),
            "And breakfast after"
        );
    }

    #[test]
    fn test_divergent_paste_stays_literal() {
        let index = FakeIndex::new().with_plan(stored_plan(
            "Ambush",
            &["[x] Plan: Ambush", "-[x] Strike from the west"],
        ));
        let mut post = post_at("Bob", 20, "[x] Plan: Ambush\n-[x] Strike from the east");
        build_working_vote(&mut post, &Quest::new("q"), &index);

        let entries = post.working_vote();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.as_line().is_some()));
    }

    #[test]
    fn test_voter_proxy_inlines_processed_target() {
        let mut alice = post_at("Alice", 10, "[x] Cake\n[x] Tea");
        let empty = FakeIndex::new();
        build_working_vote(&mut alice, &Quest::new("q"), &empty);
        alice.mark_processed();

        let index = FakeIndex::new().with_post(alice);
        let mut bob = post_at("Bob", 20, "[x] Alice");
        let outcome = build_working_vote(&mut bob, &Quest::new("q"), &index);
        assert_eq!(outcome, WorkingVoteOutcome::Complete);
        assert_eq!(bob.working_vote().len(), 2);
        assert_eq!(bob.working_vote()[0].as_line().unwrap().clean_content(), "Cake");
    }

    #[test]
    fn test_unprocessed_target_defers_whole_post() {
        let alice = post_at("Alice", 30, "[x] Cake");
        let index = FakeIndex::new().with_post(alice);
        let mut bob = post_at("Bob", 20, "[x] Alice");
        assert_eq!(
            build_working_vote(&mut bob, &Quest::new("q"), &index),
            WorkingVoteOutcome::Deferred
        );
        assert!(!bob.working_vote_complete());
    }

    #[test]
    fn test_pinned_reference_is_bounded_to_earlier_posts() {
        let mut early = post_at("Alice", 10, "[x] Cake");
        let empty = FakeIndex::new();
        build_working_vote(&mut early, &Quest::new("q"), &empty);
        early.mark_processed();
        let late = post_at("Alice", 30, "[x] Pie");

        let index = FakeIndex::new().with_post(early).with_post(late);
        let mut bob = post_at("Bob", 20, "[x] ^Alice");
        let outcome = build_working_vote(&mut bob, &Quest::new("q"), &index);
        assert_eq!(outcome, WorkingVoteOutcome::Complete);
        assert_eq!(bob.working_vote().len(), 1);
        assert_eq!(bob.working_vote()[0].as_line().unwrap().clean_content(), "Cake");
    }

    #[test]
    fn test_unknown_name_stays_literal() {
        let index = FakeIndex::new();
        let mut bob = post_at("Bob", 20, "[x] Garrus");
        build_working_vote(&mut bob, &Quest::new("q"), &index);
        assert_eq!(bob.working_vote().len(), 1);
        assert_eq!(bob.working_vote()[0].as_line().unwrap().clean_content(), "Garrus");
    }

    #[test]
    fn test_disable_proxy_votes_keeps_names_literal() {
        let mut alice = post_at("Alice", 10, "[x] Cake");
        build_working_vote(&mut alice, &Quest::new("q"), &FakeIndex::new());
        alice.mark_processed();
        let index = FakeIndex::new().with_post(alice);

        let quest = Quest::new("q").with_disable_proxy_votes(true);
        let mut bob = post_at("Bob", 20, "[x] Alice");
        build_working_vote(&mut bob, &quest, &index);
        assert_eq!(bob.working_vote().len(), 1);
        assert!(bob.working_vote()[0].as_line().is_some());
    }

    #[test]
    fn test_own_proposal_blocks_are_skipped() {
        let index = FakeIndex::new();
        let mut post = post_at(
            "Alice",
            10,
            "[x] Base Plan Caution\n-[x] Scout first\n[x] Tea",
        );
        build_working_vote(&mut post, &Quest::new("q"), &index);
        assert_eq!(post.working_vote().len(), 1);
        assert_eq!(post.working_vote()[0].as_line().unwrap().clean_content(), "Tea");
    }

    #[test]
    fn test_force_process_falls_back_to_stored_votes() {
        let stale = post_at("Alice", 30, "[x] Cake");
        let mut index = FakeIndex::new().with_post(stale);
        index.votes.push((
            "Alice".to_string(),
            VoteLineBlock::from_line(line("[x] Pie")),
        ));

        let mut bob = post_at("Bob", 20, "[x] Alice");
        bob.set_force_process(true);
        let outcome = build_working_vote(&mut bob, &Quest::new("q"), &index);
        assert_eq!(outcome, WorkingVoteOutcome::Complete);
        assert_eq!(bob.working_vote().len(), 1);
        assert!(bob.working_vote()[0].as_block().is_some());
    }
}
