//! Voter and plan identities.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::string::{agnostic_cmp, agnostic_eq, agnostic_fold, agnostic_hash_into};

/// What kind of identity an [`Origin`] names.
///
/// A user and a plan may share the same display name; they are still
/// distinct identities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    #[default]
    User,
    Plan,
}

/// The identity behind a vote: who (or which plan) it belongs to, and where
/// that identity was established.
///
/// Equality, ordering and hashing consider only the kind and the
/// agnostically folded name; the post fields are location payload.
///
/// # Example
/// ```
/// use tally_domain::origin::Origin;
///
/// let a = Origin::user("Alice").with_post(1001, 3);
/// let b = Origin::user("ALICE").with_post(2002, 9);
/// assert_eq!(a, b);
/// assert_ne!(Origin::user("Alice"), Origin::plan("Alice"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Origin {
    name: String,
    kind: IdentityKind,
    post_id: u64,
    post_number: u32,
    thread_uri: String,
    permalink: String,
}

impl Origin {
    /// Create a user identity with no post location yet.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: IdentityKind::User,
            post_id: 0,
            post_number: 0,
            thread_uri: String::new(),
            permalink: String::new(),
        }
    }

    /// Create a plan identity with no post location yet.
    pub fn plan(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: IdentityKind::Plan,
            post_id: 0,
            post_number: 0,
            thread_uri: String::new(),
            permalink: String::new(),
        }
    }

    /// Attach the post this identity was established in.
    pub fn with_post(mut self, post_id: u64, post_number: u32) -> Self {
        self.post_id = post_id;
        self.post_number = post_number;
        self
    }

    /// Attach the thread location strings.
    pub fn with_thread(
        mut self,
        thread_uri: impl Into<String>,
        permalink: impl Into<String>,
    ) -> Self {
        self.thread_uri = thread_uri.into();
        self.permalink = permalink.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> IdentityKind {
        self.kind
    }

    pub fn is_user(&self) -> bool {
        self.kind == IdentityKind::User
    }

    pub fn is_plan(&self) -> bool {
        self.kind == IdentityKind::Plan
    }

    pub fn post_id(&self) -> u64 {
        self.post_id
    }

    pub fn post_number(&self) -> u32 {
        self.post_number
    }

    pub fn thread_uri(&self) -> &str {
        &self.thread_uri
    }

    pub fn permalink(&self) -> &str {
        &self.permalink
    }

    /// The folded name this identity compares under.
    pub fn folded_name(&self) -> String {
        agnostic_fold(&self.name)
    }
}

impl PartialEq for Origin {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && agnostic_eq(&self.name, &other.name)
    }
}

impl Eq for Origin {}

impl Hash for Origin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        agnostic_hash_into(&self.name, state);
    }
}

impl PartialOrd for Origin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Origin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| agnostic_cmp(&self.name, &other.name))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IdentityKind::User => write!(f, "{}", self.name),
            IdentityKind::Plan => write!(f, "◈{}", self.name),
        }
    }
}
