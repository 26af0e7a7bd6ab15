//! Configuration file loader with multi-source merging

use super::file_config::{ConfigError, FileConfig};
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use std::path::PathBuf;
use tracing::debug;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./tallyho.toml` or `./.tallyho.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/tallyho/config.toml`
    /// 4. Fallback: `~/.config/tallyho/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        // Add global config (XDG or fallback)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                debug!("Merging global config from {}", global_path.display());
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        // Add project-level config file (check both names)
        if let Some(path) = Self::project_config_path() {
            debug!("Merging project config from {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }

        // Add explicit config path (highest priority for files)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.extract().map_err(Box::new).map_err(ConfigError::from)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/tallyho/config.toml` if set, otherwise
    /// falls back to `~/.config/tallyho/config.toml`
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tallyho").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        for filename in &["tallyho.toml", ".tallyho.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }
}
