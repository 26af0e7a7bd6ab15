//! Infrastructure layer for tallyho
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration file loading and the thread-dump
//! post source.

pub mod config;
pub mod thread;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig, FileQuestConfig, FileTallyConfig};
pub use thread::{substitute_markup, TextThreadSource};
