//! Vote line lexer.
//!
//! Turns one line of post text into a [`VoteLine`], or rejects it as
//! narrative text. The grammar is:
//!
//! ```text
//! line := prefix? marker task? content
//! ```
//!
//! | Piece   | Shape                                       | Example             |
//! |---------|---------------------------------------------|---------------------|
//! | prefix  | run of `-` / `—`, whitespace between ignored| `--`                |
//! | marker  | `[…]` run of marker chars, or a bare glyph  | `[x]`, `[#3]`, `☑`  |
//! | task    | `[…]` immediately after the marker          | `[Movie]`           |
//! | content | everything else, kept verbatim              | `Run Lola Run!`     |
//!
//! Markup brackets were replaced by sentinel characters upstream (`『`/`』`),
//! so any `[` reaching the lexer is either a marker, a task, or literal
//! content. Strike spans arrive as `❰…❱` and are folded into content wrapped
//! in `『s』…『/s』` tags; a `⦂` (a newline swallowed into the strike) aborts
//! the span without failing the line.
//!
//! The lexer never errors. Anything that does not fit the grammar simply is
//! not a vote line.

use crate::vote::line::{MarkerType, VoteLine};

/// Markup bracket sentinels substituted upstream for non-vote `[` / `]`.
pub const OPEN_BBCODE: char = '『';
pub const CLOSE_BBCODE: char = '』';
/// Strike-through span sentinels.
pub const OPEN_STRIKE: char = '❰';
pub const CLOSE_STRIKE: char = '❱';
/// A newline that was swallowed into a strike span.
pub const STRIKE_NEWLINE: char = '⦂';

const STRIKE_OPEN_TAG: &str = "『s』";
const STRIKE_CLOSE_TAG: &str = "『/s』";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    None,
    Prefix,
    Marker,
    PostMarker,
    Task,
    Content,
    Strike,
    BbCode,
}

fn is_prefix_char(c: char) -> bool {
    c == '-' || c == '—'
}

fn is_marker_char(c: char) -> bool {
    matches!(
        c,
        'x' | 'X' | '✓' | '✔' | '✗' | '✘' | 'Х' | '☒' | '☑' | '#' | '%' | '+' | '-'
    ) || c.is_ascii_digit()
}

/// Box/check glyphs accepted as a whole marker without brackets.
fn is_bare_marker_glyph(c: char) -> bool {
    matches!(c, '☒' | '☑' | '✓' | '✔' | '✗' | '✘')
}

fn is_vote_glyph(c: char) -> bool {
    matches!(c, 'x' | 'X' | '✓' | '✔' | '✗' | '✘' | 'Х' | '☒' | '☑')
}

/// Lex a single line of post text.
///
/// Returns `None` when the line is not a vote line.
///
/// # Example
/// ```
/// use tally_domain::vote::lexer::parse_line;
///
/// let line = parse_line("-[x][Movie] Run Lola Run!").unwrap();
/// assert_eq!(line.depth(), 1);
/// assert_eq!(line.task(), "Movie");
/// assert_eq!(line.content(), "Run Lola Run!");
///
/// assert!(parse_line("I think we should vote for the movie.").is_none());
/// ```
pub fn parse_line(text: &str) -> Option<VoteLine> {
    let mut state = State::None;
    let mut stack: Vec<State> = Vec::new();

    let mut prefix = String::new();
    let mut marker = String::new();
    let mut task = String::new();
    let mut content = String::new();
    let mut strike = String::new();

    for c in text.trim_end().chars() {
        match state {
            State::None | State::Prefix => {
                if c.is_whitespace() {
                    // whitespace between prefix dashes carries no depth
                } else if is_prefix_char(c) {
                    prefix.push(c);
                    state = State::Prefix;
                } else if c == '[' {
                    state = State::Marker;
                } else if is_bare_marker_glyph(c) {
                    marker.push(c);
                    state = State::PostMarker;
                } else if c == OPEN_BBCODE {
                    // markup ahead of the marker is skipped entirely
                    stack.push(state);
                    state = State::BbCode;
                } else {
                    return None;
                }
            }
            State::Marker => {
                if c == ']' {
                    if marker.is_empty() {
                        return None;
                    }
                    state = State::PostMarker;
                } else if is_marker_char(c) {
                    marker.push(c);
                } else {
                    return None;
                }
            }
            State::PostMarker => {
                if c.is_whitespace() {
                    // ignored
                } else if c == '[' {
                    state = State::Task;
                } else if c == OPEN_STRIKE {
                    stack.push(State::Content);
                    state = State::Strike;
                } else {
                    content.push(c);
                    state = State::Content;
                }
            }
            State::Task => {
                if c == ']' {
                    state = State::Content;
                } else if c == OPEN_BBCODE {
                    // markup inside a task is dropped
                    stack.push(State::Task);
                    state = State::BbCode;
                } else if c == OPEN_STRIKE {
                    stack.push(State::Task);
                    state = State::Strike;
                } else {
                    task.push(c);
                }
            }
            State::Content => {
                if c == OPEN_STRIKE {
                    stack.push(State::Content);
                    state = State::Strike;
                } else {
                    content.push(c);
                }
            }
            State::Strike => {
                if c == CLOSE_STRIKE {
                    let owner = stack.pop().unwrap_or(State::Content);
                    let buffer = std::mem::take(&mut strike);
                    if owner == State::Task {
                        // tasks stay tag-free; keep the struck text plain
                        task.push_str(&buffer);
                    } else {
                        content.push_str(STRIKE_OPEN_TAG);
                        content.push_str(&buffer);
                        content.push_str(STRIKE_CLOSE_TAG);
                    }
                    state = owner;
                } else if c == STRIKE_NEWLINE {
                    // a newline inside the span kills the whole span
                    strike.clear();
                    state = stack.pop().unwrap_or(State::Content);
                } else {
                    strike.push(c);
                }
            }
            State::BbCode => {
                if c == CLOSE_BBCODE {
                    state = stack.pop().unwrap_or(State::None);
                } else if c == OPEN_BBCODE {
                    stack.push(State::BbCode);
                }
            }
        }
    }

    // Unwind unterminated spans, keeping what they had accumulated.
    loop {
        match state {
            State::Strike => {
                let owner = stack.pop().unwrap_or(State::Content);
                let buffer = std::mem::take(&mut strike);
                if owner == State::Task {
                    task.push_str(&buffer);
                } else {
                    content.push_str(&buffer);
                }
                state = owner;
            }
            State::BbCode => {
                state = stack.pop().unwrap_or(State::None);
            }
            _ => break,
        }
    }

    match state {
        State::None | State::Prefix | State::Marker => return None,
        State::Task => {
            // an unterminated task bracket was really content
            content = format!("[{task}");
            task.clear();
        }
        _ => {}
    }

    let (marker_type, marker_value) = classify_marker(&marker)?;

    Some(VoteLine::new(
        prefix,
        marker,
        marker_type,
        marker_value,
        task.trim(),
        content.trim(),
    ))
}

/// Classify a marker's raw text into type and value.
///
/// | Marker                     | Type     | Value              |
/// |----------------------------|----------|--------------------|
/// | `x`, `X`, check/box glyphs | Vote     | 100                |
/// | `#N` or bare `N`           | Rank     | N clamped to 1..=9 |
/// | `N%`                       | Score    | N clamped to 0..=100 |
/// | `+`                        | Approval | 80                 |
/// | `-`                        | Approval | 20                 |
///
/// Anything else rejects the whole line.
fn classify_marker(marker: &str) -> Option<(MarkerType, u32)> {
    if marker.is_empty() {
        return None;
    }
    if marker.chars().all(is_vote_glyph) {
        return Some((MarkerType::Vote, 100));
    }
    if marker == "+" {
        return Some((MarkerType::Approval, 80));
    }
    if marker == "-" {
        return Some((MarkerType::Approval, 20));
    }
    if let Some(digits) = marker.strip_prefix('#') {
        let value: u32 = digits.parse().ok()?;
        return Some((MarkerType::Rank, value.clamp(1, 9)));
    }
    if let Some(digits) = marker.strip_suffix('%') {
        let value: u32 = digits.parse().ok()?;
        return Some((MarkerType::Score, value.min(100)));
    }
    if marker.chars().all(|c| c.is_ascii_digit()) {
        let value: u32 = marker.parse().ok()?;
        return Some((MarkerType::Rank, value.clamp(1, 9)));
    }
    None
}

/// Remove every `『…』` markup span from a string in a single pass.
///
/// Independent of [`parse_line`]; used to derive clean content and to tidy
/// arbitrary text. An unterminated span degrades to its literal text.
pub fn strip_bb_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut span = String::new();
    let mut in_span = false;
    for c in text.chars() {
        if in_span {
            if c == CLOSE_BBCODE {
                span.clear();
                in_span = false;
            } else {
                span.push(c);
            }
        } else if c == OPEN_BBCODE {
            in_span = true;
        } else if c == CLOSE_BBCODE {
            // stray close sentinel, dropped
        } else {
            out.push(c);
        }
    }
    if in_span {
        out.push(OPEN_BBCODE);
        out.push_str(&span);
    }
    out
}
