//! BBCode sentinel substitution
//!
//! The vote-line lexer reserves `[` for vote markers and tasks, so real
//! BBCode has to be taken out of its way before lexing. Known tags keep
//! their text but swap brackets for the `『…』` sentinels; `[s]` strike
//! spans become `❰…❱` with `⦂` standing in for swallowed newlines, so
//! struck content stays attached to its line.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Tag names that get sentinel brackets. Anything else (vote markers,
/// tasks, bare bracketed asides) is left for the lexer to judge.
const KNOWN_TAGS: &[&str] = &[
    "b", "i", "u", "s", "color", "url", "quote", "spoiler", "size", "font", "img", "center",
];

static STRIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\[s\](?P<body>.*?)\[/s\]").expect("strike pattern"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[/?(?P<name>[a-z]+)(?:=[^\]\n]*)?\]").expect("tag pattern"));

/// Substitute sentinel brackets for known BBCode in a whole post body.
pub fn substitute_markup(text: &str) -> String {
    let text = STRIKE_RE.replace_all(text, |caps: &Captures<'_>| {
        let body = caps["body"].replace('\n', "⦂");
        format!("❰{body}❱")
    });
    TAG_RE
        .replace_all(&text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            if KNOWN_TAGS.contains(&caps["name"].to_ascii_lowercase().as_str()) {
                format!("『{}』", &whole[1..whole.len() - 1])
            } else {
                whole.to_string()
            }
        })
        .into_owned()
}
