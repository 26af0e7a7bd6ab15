//! CLI command definitions

use crate::output::formatter::DisplayMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for tally reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored console report
    Console,
    /// Forum-ready BBCode for reposting
    Bbcode,
    /// JSON output
    Json,
}

impl OutputFormat {
    /// Parse the config-file spelling of an output format.
    pub fn parse_config(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "console" | "terminal" => Some(OutputFormat::Console),
            "bbcode" | "forum" => Some(OutputFormat::Bbcode),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// CLI arguments for tallyho
#[derive(Parser, Debug)]
#[command(name = "tallyho")]
#[command(author, version, about = "Tallies votes in forum quest threads")]
#[command(long_about = r#"
Tallyho reads a saved thread dump, resolves plans and proxy references,
and prints the aggregated vote tally.

Votes are bracket-marked lines inside posts:
  [x] Take the mountain pass
  [x] Plan: Ambush
  -[x] Flank left

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./tallyho.toml      Project-level config
3. ~/.config/tallyho/config.toml   Global config

Example:
  tallyho thread.txt
  tallyho thread.txt --partition by-line --output bbcode
  tallyho thread.txt --quest "Into the Breach" --display compact
"#)]
pub struct Cli {
    /// Path to the thread dump to tally
    pub thread: Option<PathBuf>,

    /// Quest name override
    #[arg(long, value_name = "NAME")]
    pub quest: Option<String>,

    /// Partition mode override (none, by-line, by-line-task, by-block)
    #[arg(short, long, value_name = "MODE")]
    pub partition: Option<String>,

    /// Output format (overrides the configured default)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Display mode (overrides the configured default)
    #[arg(short, long, value_enum)]
    pub display: Option<DisplayMode>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,
}
