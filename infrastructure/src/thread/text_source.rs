//! Plain-text thread dump post source
//!
//! Reads a whole thread from one file of `[post=…]…[/post]` containers:
//!
//! ```text
//! [post=1001 number=1 author="QM" threadmark="Chapter 1"]
//! The enemy advances.
//! [/post]
//! [post=1004 number=2 author="Good Voter"]
//! [x] Hold the line
//! [/post]
//! ```
//!
//! Post ids are forum-global, post numbers are thread-relative. Bodies
//! pass through sentinel substitution before lexing so genuine BBCode
//! never collides with vote brackets.

use crate::thread::markup::substitute_markup;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use tally_application::{PostSource, SourceError};
use tally_domain::{Origin, Post, Quest};
use tracing::{debug, info};

static POST_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*\[post=(?P<id>\d+)\s+number=(?P<number>\d+)\s+author="(?P<author>[^"]+)"(?:\s+threadmark="(?P<threadmark>[^"]*)")?\]\s*$"#,
    )
    .expect("post header pattern")
});

/// A `PostSource` over a thread dump file.
pub struct TextThreadSource {
    path: PathBuf,
    thread_uri: String,
}

impl TextThreadSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let thread_uri = format!("file://{}", path.display());
        Self { path, thread_uri }
    }

    /// Use the original thread's address for origins and permalinks
    /// instead of the dump file's path.
    pub fn with_thread_uri(mut self, uri: impl Into<String>) -> Self {
        self.thread_uri = uri.into();
        self
    }
}

impl PostSource for TextThreadSource {
    fn fetch_posts(&self, quest: &Quest) -> Result<Vec<Post>, SourceError> {
        let raw = fs::read_to_string(&self.path)?;
        let posts = parse_thread(&raw, &self.thread_uri, quest)?;
        info!("Read {} posts from {}", posts.len(), self.path.display());
        Ok(posts)
    }
}

struct PostHeader {
    id: u64,
    number: u32,
    author: String,
    threadmark: Option<String>,
}

fn parse_thread(raw: &str, thread_uri: &str, quest: &Quest) -> Result<Vec<Post>, SourceError> {
    let raw = raw.replace("\r\n", "\n");
    let mut posts = Vec::new();
    let mut current: Option<(PostHeader, Vec<&str>)> = None;

    for (line_no, line) in raw.lines().enumerate() {
        if let Some(caps) = POST_OPEN_RE.captures(line) {
            if current.is_some() {
                return Err(SourceError::Malformed(format!(
                    "line {}: post opened inside another post",
                    line_no + 1
                )));
            }
            current = Some((parse_header(&caps, line_no)?, Vec::new()));
        } else if line.trim() == "[/post]" {
            let (header, body) = current.take().ok_or_else(|| {
                SourceError::Malformed(format!(
                    "line {}: [/post] without an open post",
                    line_no + 1
                ))
            })?;
            if let Some(post) = build_post(header, &body, thread_uri, quest) {
                posts.push(post);
            }
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
        // text between containers is ignored
    }

    if current.is_some() {
        return Err(SourceError::Malformed(
            "unterminated post container".to_string(),
        ));
    }
    Ok(posts)
}

fn parse_header(caps: &regex::Captures<'_>, line_no: usize) -> Result<PostHeader, SourceError> {
    let id = caps["id"].parse::<u64>().map_err(|_| {
        SourceError::Malformed(format!("line {}: post id out of range", line_no + 1))
    })?;
    let number = caps["number"].parse::<u32>().map_err(|_| {
        SourceError::Malformed(format!("line {}: post number out of range", line_no + 1))
    })?;
    Ok(PostHeader {
        id,
        number,
        author: caps["author"].to_string(),
        threadmark: caps.name("threadmark").map(|m| m.as_str().to_string()),
    })
}

fn build_post(header: PostHeader, body: &[&str], thread_uri: &str, quest: &Quest) -> Option<Post> {
    if let Some(threadmark) = &header.threadmark {
        if quest.threadmark_filter().matches(threadmark) {
            debug!("Skipping threadmarked side content: {}", threadmark);
            return None;
        }
    }
    let origin = Origin::user(header.author)
        .with_post(header.id, header.number)
        .with_thread(thread_uri, format!("{thread_uri}#post-{}", header.id));
    Some(Post::new(origin, substitute_markup(&body.join("\n"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const THREAD_URI: &str = "https://forum.example/t/quest";

    fn parse(dump: &str) -> Vec<Post> {
        parse_thread(dump, THREAD_URI, &Quest::new("Test Quest")).unwrap()
    }

    #[test]
    fn test_parses_posts_with_origins() {
        let posts = parse(concat!(
            "[post=1001 number=1 author=\"QM\" threadmark=\"Chapter 1\"]\n",
            "The enemy advances.\n",
            "[/post]\n",
            "[post=1004 number=2 author=\"Good Voter\"]\n",
            "[x] Hold the line\n",
            "[/post]\n",
        ));

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].author(), "QM");
        assert!(!posts[0].has_vote());
        assert_eq!(posts[1].origin().post_id(), 1004);
        assert_eq!(posts[1].origin().post_number(), 2);
        assert_eq!(
            posts[1].origin().permalink(),
            "https://forum.example/t/quest#post-1004"
        );
        assert!(posts[1].has_vote());
    }

    #[test]
    fn test_omake_threadmarks_are_skipped() {
        let posts = parse(concat!(
            "[post=1 number=1 author=\"QM\" threadmark=\"Omake: Beach Day\"]\n",
            "[x] Not a real vote\n",
            "[/post]\n",
            "[post=2 number=2 author=\"QM\" threadmark=\"Chapter 2\"]\n",
            "Story continues.\n",
            "[/post]\n",
        ));

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].origin().post_number(), 2);
    }

    #[test]
    fn test_markup_is_substituted_before_lexing() {
        let posts = parse(concat!(
            "[post=7 number=2 author=\"Voter\"]\n",
            "[x] Hold [b]the line[/b]\n",
            "[/post]\n",
        ));

        let line = &posts[0].vote_lines()[0];
        assert_eq!(line.content(), "Hold 『b』the line『/b』");
        assert_eq!(line.clean_content(), "Hold the line");
    }

    #[test]
    fn test_strike_markup_round_trips_through_the_lexer() {
        let posts = parse(concat!(
            "[post=7 number=2 author=\"Voter\"]\n",
            "[x] Go [s]west[/s] east\n",
            "[/post]\n",
        ));

        let line = &posts[0].vote_lines()[0];
        assert_eq!(line.content(), "Go 『s』west『/s』 east");
        assert_eq!(line.clean_content(), "Go west east");
    }

    #[test]
    fn test_multiline_strike_collapses_into_one_line() {
        let posts = parse(concat!(
            "[post=7 number=2 author=\"Voter\"]\n",
            "[x] Advance [s]retreat\nflee[/s] now\n",
            "[/post]\n",
        ));

        assert_eq!(posts[0].vote_lines().len(), 1);
        let clean = posts[0].vote_lines()[0].clean_content();
        assert!(!clean.contains("retreat"));
    }

    #[test]
    fn test_text_between_containers_is_ignored() {
        let posts = parse(concat!(
            "exported 2026-06-01\n",
            "[post=1 number=1 author=\"QM\"]\n",
            "Story.\n",
            "[/post]\n",
            "-- page break --\n",
        ));
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn test_nested_open_is_malformed() {
        let err = parse_thread(
            "[post=1 number=1 author=\"A\"]\n[post=2 number=2 author=\"B\"]\n[/post]\n",
            THREAD_URI,
            &Quest::new("Test Quest"),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn test_unterminated_container_is_malformed() {
        let err = parse_thread(
            "[post=1 number=1 author=\"A\"]\n[x] dangling\n",
            THREAD_URI,
            &Quest::new("Test Quest"),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn test_stray_close_is_malformed() {
        let err = parse_thread("[/post]\n", THREAD_URI, &Quest::new("Test Quest")).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn test_fetch_posts_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[post=42 number=3 author=\"Reader\"]\n[x] Keep reading\n[/post]\n"
        )
        .unwrap();

        let source = TextThreadSource::new(file.path()).with_thread_uri(THREAD_URI);
        let posts = source.fetch_posts(&Quest::new("Test Quest")).unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].origin().post_id(), 42);
        assert_eq!(
            posts[0].origin().permalink(),
            "https://forum.example/t/quest#post-42"
        );
    }
}
