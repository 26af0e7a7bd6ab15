//! Configuration file loading for tallyho
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./tallyho.toml` or `./.tallyho.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/tallyho/config.toml`
//! 4. Fallback: `~/.config/tallyho/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{ConfigError, FileConfig, FileQuestConfig, FileTallyConfig};
pub use loader::ConfigLoader;
