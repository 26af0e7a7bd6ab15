//! Post source port
//!
//! Defines the interface for loading a quest's posts from wherever the
//! thread lives. The tally engine only ever sees `Post` values; where
//! they come from (a text dump, an export file) is an adapter concern.

use tally_domain::{Post, Quest};
use thiserror::Error;

/// Errors that can occur while fetching posts
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read thread: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed thread dump: {0}")]
    Malformed(String),
}

/// Capability interface for loading the posts of a quest thread
///
/// Implementations live in the infrastructure layer. Posts must come
/// back in thread order with their origins filled in; the quest is
/// passed so sources can apply its threadmark filter.
pub trait PostSource {
    /// Fetch every countable post of the quest's thread, in thread order.
    fn fetch_posts(&self, quest: &Quest) -> Result<Vec<Post>, SourceError>;
}
