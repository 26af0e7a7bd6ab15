//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; conversion into domain types happens
//! in [`FileQuestConfig::to_quest`] so every validation failure surfaces
//! as a [`ConfigError`] instead of a half-configured run.

use serde::{Deserialize, Serialize};
use tally_application::TallyBehavior;
use tally_domain::{ContentFilter, DomainError, PartitionMode, Quest, TaskFilter};
use thiserror::Error;

/// Errors that can occur while loading or converting configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid quest configuration: {0}")]
    Quest(#[from] DomainError),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Complete file configuration (raw TOML structure)
///
/// # Example
///
/// ```toml
/// [quest]
/// name = "Into the Breach"
/// partition = "by-line-task"
/// tasks = ["Movie", "Snack"]
///
/// [tally]
/// resolve_stalled_references = true
/// output = "bbcode"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Quest definition and resolution policy
    pub quest: FileQuestConfig,
    /// Tally run and output settings
    pub tally: FileTallyConfig,
}

impl FileConfig {
    /// Render the effective configuration back to TOML (for `--show-config`).
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Raw quest configuration from TOML (`[quest]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQuestConfig {
    /// Quest display name
    pub name: String,
    /// Partition mode: "none", "by-line", "by-line-task", "by-block"
    pub partition: String,
    /// Cut extended commentary off long vote lines
    pub trim_extended_text: bool,
    /// Ignore whole-post implicit plans
    pub forbid_implicit_plans: bool,
    /// Never resolve a bare name to another voter's vote
    pub disable_proxy_votes: bool,
    /// Bound every voter proxy to posts at or before the referencing post
    pub force_pinned_proxy_votes: bool,
    /// Only `Plan:`-labeled references may resolve to plans
    pub force_plan_references_labeled: bool,
    /// Task allowlist; empty means every task counts
    pub tasks: Vec<String>,
    /// Threadmark pattern for side content to skip; empty keeps the
    /// stock omake filter
    pub threadmark_filter: String,
    /// Annotate output with post numbers
    pub debug: bool,
}

impl Default for FileQuestConfig {
    fn default() -> Self {
        Self {
            name: "Quest".to_string(),
            partition: "none".to_string(),
            trim_extended_text: false,
            forbid_implicit_plans: false,
            disable_proxy_votes: false,
            force_pinned_proxy_votes: false,
            force_plan_references_labeled: false,
            tasks: Vec::new(),
            threadmark_filter: String::new(),
            debug: false,
        }
    }
}

impl FileQuestConfig {
    /// Convert the raw section into a validated domain [`Quest`].
    pub fn to_quest(&self) -> Result<Quest, ConfigError> {
        let partition: PartitionMode = self.partition.parse()?;
        let threadmark_filter = if self.threadmark_filter.trim().is_empty() {
            ContentFilter::default_threadmark()
        } else {
            ContentFilter::from_pattern(&self.threadmark_filter)?
        };
        Ok(Quest::new(&self.name)
            .with_partition_mode(partition)
            .with_trim_extended_text(self.trim_extended_text)
            .with_forbid_implicit_plans(self.forbid_implicit_plans)
            .with_disable_proxy_votes(self.disable_proxy_votes)
            .with_force_pinned_proxy_votes(self.force_pinned_proxy_votes)
            .with_force_plan_references_labeled(self.force_plan_references_labeled)
            .with_task_filter(TaskFilter::new(self.tasks.clone()))
            .with_threadmark_filter(threadmark_filter)
            .with_debug_mode(self.debug))
    }
}

/// Raw tally run configuration from TOML (`[tally]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTallyConfig {
    /// Run a final force-processing pass over stalled references
    pub resolve_stalled_references: bool,
    /// Default output format: "console", "bbcode", "json"
    pub output: String,
    /// Default display mode: "full", "compact"
    pub display: String,
}

impl Default for FileTallyConfig {
    fn default() -> Self {
        Self {
            resolve_stalled_references: false,
            output: "console".to_string(),
            display: "full".to_string(),
        }
    }
}

impl FileTallyConfig {
    pub fn to_behavior(&self) -> TallyBehavior {
        TallyBehavior::default().with_resolve_stalled_references(self.resolve_stalled_references)
    }
}
