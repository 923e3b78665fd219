//! Shared utilities: logging and configuration
//!
//! This crate provides the ambient setup used by the plugin binary and the fetcher.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigBuilder, CredentialSource, PluginConfig};
pub use logging::{init_logging_with_config, LogConfig, LogFormat};
