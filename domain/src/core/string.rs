//! String utilities for the domain layer.
//!
//! Vote text is compared "agnostically": case, character width, whitespace
//! and punctuation are all ignored, so `A  basicvoteline` and
//! `A basic vote line` count as the same content.

use std::cmp::Ordering;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Fold a string for agnostic comparison.
///
/// Keeps only alphanumeric characters, maps full-width ASCII forms to their
/// half-width equivalents, and lowercases the result. Whitespace,
/// punctuation and symbols all disappear.
///
/// # Example
/// ```
/// use tally_domain::core::string::agnostic_fold;
///
/// assert_eq!(agnostic_fold("A  basic vote-line!"), "abasicvoteline");
/// assert_eq!(agnostic_fold("Ｒｕｎ Lola"), "runlola");
/// ```
pub fn agnostic_fold(s: &str) -> String {
    let mut folded = String::with_capacity(s.len());
    for c in s.chars() {
        let c = fold_width(c);
        if c.is_alphanumeric() {
            folded.extend(c.to_lowercase());
        }
    }
    folded
}

/// Map full-width ASCII variants (U+FF01..=U+FF5E) to their half-width forms.
fn fold_width(c: char) -> char {
    match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}

/// Agnostic equality of two strings.
pub fn agnostic_eq(a: &str, b: &str) -> bool {
    agnostic_fold(a) == agnostic_fold(b)
}

/// Agnostic ordering of two strings.
pub fn agnostic_cmp(a: &str, b: &str) -> Ordering {
    agnostic_fold(a).cmp(&agnostic_fold(b))
}

/// Feed the agnostic fold of a string into a hasher.
///
/// Value types whose equality is agnostic hash through this so that equal
/// values always land in the same bucket.
pub fn agnostic_hash_into<H: Hasher>(s: &str, state: &mut H) {
    agnostic_fold(s).hash(state);
}

/// Standalone agnostic hash, mostly useful in tests.
pub fn agnostic_hash(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    agnostic_hash_into(s, &mut hasher);
    hasher.finish()
}

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
