//! Extended-text trimming.
//!
//! Voters sometimes write a short directive followed by a paragraph of
//! justification in one vote line. When a quest enables trimming, such
//! lines are cut back to their leading description so that differently
//! justified copies of the same choice still merge.

use crate::core::string::agnostic_fold;

/// Minimum clean-content length before trimming is considered.
const TRIM_FLOOR: usize = 50;

/// Try to trim a long content string down to its leading description.
///
/// Returns `None` when the text should stay untouched. The search runs in
/// three steps:
///
/// 1. Collect separator candidates in the first 30% of the text: a colon
///    (unless it ends a plan label or starts a URI scheme), an em dash, or
///    a hyphen followed by whitespace or a word not starting lowercase.
/// 2. Exactly one candidate cuts there; with several, cut at the last one
///    whose preceding text has more than one word.
/// 3. Otherwise fall back to the first sentence: inside the first 50%, cut
///    just after `.`/`!`/`?` that is followed by a word not starting
///    lowercase.
pub fn trim_extended_content(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < TRIM_FLOOR {
        return None;
    }

    let window = chars.len() * 3 / 10;
    let candidates: Vec<usize> = (1..window)
        .filter(|&i| is_separator(&chars, i))
        .collect();

    let cut = match candidates.len() {
        0 => None,
        1 => Some(candidates[0]),
        _ => candidates
            .iter()
            .rev()
            .find(|&&i| word_count(&chars[..i]) > 1)
            .copied(),
    };

    if let Some(i) = cut {
        return Some(collect_trimmed(&chars[..i]));
    }

    first_sentence_cut(&chars).map(|end| collect_trimmed(&chars[..end]))
}

fn is_separator(chars: &[char], i: usize) -> bool {
    match chars[i] {
        ':' => !is_plan_label_colon(chars, i) && !is_uri_scheme_colon(chars, i),
        '—' => true,
        '-' => match chars.get(i + 1) {
            Some(next) => next.is_whitespace() || !next.is_lowercase(),
            None => false,
        },
        _ => false,
    }
}

/// A colon that merely closes a `Plan:` style label is not a separator.
fn is_plan_label_colon(chars: &[char], i: usize) -> bool {
    let before: String = chars[..i].iter().collect();
    matches!(
        agnostic_fold(&before).as_str(),
        "plan" | "baseplan" | "proposedplan"
    )
}

/// A colon directly followed by `//` belongs to a URI scheme.
fn is_uri_scheme_colon(chars: &[char], i: usize) -> bool {
    chars.get(i + 1) == Some(&'/') && chars.get(i + 2) == Some(&'/')
}

fn word_count(chars: &[char]) -> usize {
    chars.iter().collect::<String>().split_whitespace().count()
}

/// Cut just after sentence-ending punctuation followed by a word that does
/// not start lowercase, searching the first half of the text.
fn first_sentence_cut(chars: &[char]) -> Option<usize> {
    let window = chars.len() / 2;
    for i in 0..window {
        if matches!(chars[i], '.' | '!' | '?') {
            let mut j = i + 1;
            let mut saw_space = false;
            while j < chars.len() && chars[j].is_whitespace() {
                saw_space = true;
                j += 1;
            }
            if saw_space && j < chars.len() && !chars[j].is_lowercase() {
                return Some(i + 1);
            }
        }
    }
    None
}

fn collect_trimmed(chars: &[char]) -> String {
    chars.iter().collect::<String>().trim_end().to_string()
}
