//! Phase 1: finding the plan definitions a post contains.

use crate::core::string::agnostic_eq;
use crate::index::VoteIndex;
use crate::post::Post;
use crate::quest::Quest;
use crate::vote::block::VoteLineBlock;
use crate::vote::blocks::{
    classify_plan_label, implicit_plan_name, is_base_plan, is_explicit_plan, is_implicit_plan,
    split_into_blocks,
};

/// How a post is segmented when hunting for plan definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanScope {
    /// Cut into depth-0 blocks and inspect each one.
    Blocks,
    /// Treat the whole post as a single candidate.
    WholePost,
}

/// Which plan family one extraction pass accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// `Base Plan` / `Proposed Plan` proposals.
    Base,
    /// Labeled `Plan: X` definitions.
    Explicit,
    /// Unlabeled nomination groups.
    Implicit,
}

/// Scan a post for plan definitions of one kind.
///
/// A candidate is accepted only if its task passes the quest's task filter
/// and its name does not collide with a *different* voter's name (an author
/// may name a plan after themselves). Within one post the first accepted
/// name wins; later duplicates never merge. Returns definitions in scan
/// order, unnormalized.
pub fn extract_plans(
    post: &Post,
    quest: &Quest,
    index: &dyn VoteIndex,
    scope: PlanScope,
    kind: PlanKind,
) -> Vec<(String, VoteLineBlock)> {
    if kind == PlanKind::Implicit && quest.forbid_implicit_plans() {
        return Vec::new();
    }

    let candidates: Vec<VoteLineBlock> = match scope {
        PlanScope::Blocks => split_into_blocks(post.vote_lines().to_vec()),
        PlanScope::WholePost => VoteLineBlock::new(post.vote_lines().to_vec())
            .ok()
            .into_iter()
            .collect(),
    };

    let mut accepted: Vec<(String, VoteLineBlock)> = Vec::new();
    for block in candidates {
        let name = match kind {
            PlanKind::Base if is_base_plan(&block) => {
                classify_plan_label(block.first()).map(|(_, name)| name)
            }
            PlanKind::Explicit if is_explicit_plan(&block) => {
                classify_plan_label(block.first()).map(|(_, name)| name)
            }
            PlanKind::Implicit if is_implicit_plan(block.lines()) => {
                implicit_plan_name(block.lines())
            }
            _ => None,
        };
        let Some(name) = name else {
            continue;
        };
        if !quest.task_filter().allows(block.task()) {
            continue;
        }
        if index.has_voter(&name) && index.voter_origin(&name) != Some(post.origin()) {
            continue;
        }
        if accepted.iter().any(|(seen, _)| agnostic_eq(seen, &name)) {
            continue;
        }
        accepted.push((name, block));
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::testing::FakeIndex;
    use crate::origin::Origin;

    fn post(author: &str, text: &str) -> Post {
        Post::new(Origin::user(author).with_post(100, 10), text)
    }

    #[test]
    fn test_explicit_plan_is_extracted() {
        let p = post("Alice", "[x] Plan: Ambush\n-[x] Strike from the west\n-[x] At dawn");
        let index = FakeIndex::new();
        let plans = extract_plans(&p, &Quest::new("q"), &index, PlanScope::Blocks, PlanKind::Explicit);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].0, "Ambush");
        assert_eq!(plans[0].1.len(), 3);
    }

    #[test]
    fn test_bare_label_is_a_reference_not_a_definition() {
        let p = post("Alice", "[x] Plan: Ambush");
        let index = FakeIndex::new();
        let plans = extract_plans(&p, &Quest::new("q"), &index, PlanScope::Blocks, PlanKind::Explicit);
        assert!(plans.is_empty());
    }

    #[test]
    fn test_base_pass_ignores_plain_plans() {
        let p = post(
            "Alice",
            "[x] Base Plan Caution\n-[x] Scout first\n[x] Plan: Ambush\n-[x] Strike",
        );
        let index = FakeIndex::new();
        let base = extract_plans(&p, &Quest::new("q"), &index, PlanScope::Blocks, PlanKind::Base);
        assert_eq!(base.len(), 1);
        assert_eq!(base[0].0, "Caution");
    }

    #[test]
    fn test_implicit_plan_over_whole_post() {
        let p = post("Alice", "[x] Ambush the caravan\n-[x] From the west");
        let index = FakeIndex::new();
        let plans = extract_plans(
            &p,
            &Quest::new("q"),
            &index,
            PlanScope::WholePost,
            PlanKind::Implicit,
        );
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].0, "Ambush the caravan");

        let forbidding = Quest::new("q").with_forbid_implicit_plans(true);
        assert!(extract_plans(&p, &forbidding, &index, PlanScope::WholePost, PlanKind::Implicit)
            .is_empty());
    }

    #[test]
    fn test_plan_named_after_another_voter_is_rejected() {
        let p = post("Alice", "[x] Plan: Bob\n-[x] Do what Bob said");
        let quest = Quest::new("q");
        let stranger = FakeIndex::new().with_voter(Origin::user("Bob"));
        assert!(
            extract_plans(&p, &quest, &stranger, PlanScope::Blocks, PlanKind::Explicit).is_empty()
        );

        // naming a plan after yourself is allowed
        let own = post("Bob", "[x] Plan: Bob\n-[x] My usual approach");
        let index = FakeIndex::new().with_voter(Origin::user("Bob"));
        let plans = extract_plans(&own, &quest, &index, PlanScope::Blocks, PlanKind::Explicit);
        assert_eq!(plans.len(), 1);
    }

    #[test]
    fn test_duplicate_names_first_wins() {
        let p = post(
            "Alice",
            "[x] Plan: Ambush\n-[x] First version\n[x] plan ambush\n-[x] Second version",
        );
        let index = FakeIndex::new();
        let plans = extract_plans(&p, &Quest::new("q"), &index, PlanScope::Blocks, PlanKind::Explicit);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].1.lines()[1].clean_content(), "First version");
    }

    #[test]
    fn test_task_filter_gates_plans() {
        let p = post("Alice", "[x][Side] Plan: Ambush\n-[x] Strike");
        let quest = Quest::new("q").with_task_filter(crate::quest::TaskFilter::new(vec![
            "Main".to_string(),
        ]));
        let index = FakeIndex::new();
        assert!(extract_plans(&p, &quest, &index, PlanScope::Blocks, PlanKind::Explicit).is_empty());
    }
}
