//! Quest configuration: how one thread's votes are interpreted.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;
use crate::core::string::agnostic_eq;

/// How a multi-line vote splits into independently counted units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionMode {
    /// The whole vote is one unit.
    #[default]
    None,
    /// Every line is its own unit.
    ByLine,
    /// Every line is its own unit, inheriting tasks from its ancestors.
    ByLineTask,
    /// Each depth-0 line and its children form one unit.
    ByBlock,
}

impl PartitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionMode::None => "none",
            PartitionMode::ByLine => "by-line",
            PartitionMode::ByLineTask => "by-line-task",
            PartitionMode::ByBlock => "by-block",
        }
    }
}

impl fmt::Display for PartitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PartitionMode::None),
            "by-line" | "byline" | "line" => Ok(PartitionMode::ByLine),
            "by-line-task" | "bylinetask" | "line-task" => Ok(PartitionMode::ByLineTask),
            "by-block" | "byblock" | "block" => Ok(PartitionMode::ByBlock),
            other => Err(DomainError::InvalidPartitionMode(other.to_string())),
        }
    }
}

/// How a referenced plan's body is extracted into partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanBodyMode {
    /// Promote to minimum depth, then one partition per line.
    ByLine,
    /// Keep an explicitly labeled plan intact; re-split anything else.
    ByBlock,
    /// Always re-split at depth 0, labeled or not.
    ByBlockAll,
}

/// An allowlist of tasks, compared agnostically. Empty allows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    allowed: Vec<String>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn allows(&self, task: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|t| agnostic_eq(t, task))
    }
}

/// A regex include-test over free text. Callers decide what a match means;
/// the thread source uses it to skip threadmarked side content.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    regex: Option<Regex>,
}

impl ContentFilter {
    /// A filter matching nothing.
    pub fn none() -> Self {
        Self { regex: None }
    }

    /// The stock threadmark filter: omake chapters don't carry votes.
    pub fn default_threadmark() -> Self {
        Self {
            // the stock pattern is fixed and known-good
            regex: Regex::new(r"(?i)\bomake\b").ok(),
        }
    }

    /// Compile a caller-supplied pattern, case-insensitively.
    pub fn from_pattern(pattern: &str) -> Result<Self, DomainError> {
        if pattern.trim().is_empty() {
            return Ok(Self::none());
        }
        let regex = Regex::new(&format!("(?i){pattern}"))
            .map_err(|e| DomainError::InvalidFilter(e.to_string()))?;
        Ok(Self { regex: Some(regex) })
    }

    pub fn pattern(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(text))
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::none()
    }
}

/// Everything the resolution engine needs to know about one quest.
///
/// Replaces ambient flags with explicit configuration threaded through
/// every call; the engine itself holds no global state.
#[derive(Debug, Clone)]
pub struct Quest {
    name: String,
    partition_mode: PartitionMode,
    trim_extended_text: bool,
    forbid_implicit_plans: bool,
    disable_proxy_votes: bool,
    force_pinned_proxy_votes: bool,
    force_plan_references_labeled: bool,
    task_filter: TaskFilter,
    threadmark_filter: ContentFilter,
    debug_mode: bool,
}

impl Quest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_mode: PartitionMode::None,
            trim_extended_text: false,
            forbid_implicit_plans: false,
            disable_proxy_votes: false,
            force_pinned_proxy_votes: false,
            force_plan_references_labeled: false,
            task_filter: TaskFilter::all(),
            threadmark_filter: ContentFilter::default_threadmark(),
            debug_mode: false,
        }
    }

    pub fn with_partition_mode(mut self, mode: PartitionMode) -> Self {
        self.partition_mode = mode;
        self
    }

    pub fn with_trim_extended_text(mut self, trim: bool) -> Self {
        self.trim_extended_text = trim;
        self
    }

    pub fn with_forbid_implicit_plans(mut self, forbid: bool) -> Self {
        self.forbid_implicit_plans = forbid;
        self
    }

    pub fn with_disable_proxy_votes(mut self, disable: bool) -> Self {
        self.disable_proxy_votes = disable;
        self
    }

    pub fn with_force_pinned_proxy_votes(mut self, force: bool) -> Self {
        self.force_pinned_proxy_votes = force;
        self
    }

    pub fn with_force_plan_references_labeled(mut self, force: bool) -> Self {
        self.force_plan_references_labeled = force;
        self
    }

    pub fn with_task_filter(mut self, filter: TaskFilter) -> Self {
        self.task_filter = filter;
        self
    }

    pub fn with_threadmark_filter(mut self, filter: ContentFilter) -> Self {
        self.threadmark_filter = filter;
        self
    }

    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partition_mode(&self) -> PartitionMode {
        self.partition_mode
    }

    pub fn trim_extended_text(&self) -> bool {
        self.trim_extended_text
    }

    pub fn forbid_implicit_plans(&self) -> bool {
        self.forbid_implicit_plans
    }

    pub fn disable_proxy_votes(&self) -> bool {
        self.disable_proxy_votes
    }

    pub fn force_pinned_proxy_votes(&self) -> bool {
        self.force_pinned_proxy_votes
    }

    pub fn force_plan_references_labeled(&self) -> bool {
        self.force_plan_references_labeled
    }

    pub fn task_filter(&self) -> &TaskFilter {
        &self.task_filter
    }

    pub fn threadmark_filter(&self) -> &ContentFilter {
        &self.threadmark_filter
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }
}
