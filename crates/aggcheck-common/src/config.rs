//! Configuration for the aggregator check
//!
//! Options are layered: defaults, then an optional TOML file, then
//! `AGGCHECK_*` environment variables, then command-line flags. The layered
//! [`Config`] is resolved once into a [`PluginConfig`] which is what the
//! fetcher consumes.

use aggcheck_core::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Name of the required aggregator option, as spelled on the command line
pub const AGGREGATOR_NAME_OPTION: &str = "config-aggregator-name";

/// Layered configuration as read from file, environment and flags
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Aggregator selection
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// AWS session settings
    #[serde(default)]
    pub aws: AwsSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (AGGCHECK_ prefix)
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge with variables from an arbitrary lookup
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("AGGCHECK_AGGREGATOR_NAME") {
            self.aggregator.name = val;
        }
        if let Some(val) = lookup("AGGCHECK_AWS_REGION") {
            self.aws.region = Some(val);
        }

        // Logging
        if let Some(val) = lookup("AGGCHECK_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("AGGCHECK_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }

    /// Validate and resolve into the configuration used for a run
    pub fn resolve(&self) -> Result<PluginConfig> {
        // Blank names are rejected, anything else is sent exactly as given
        if self.aggregator.name.trim().is_empty() {
            return Err(Error::MissingOption {
                name: AGGREGATOR_NAME_OPTION.to_string(),
            });
        }

        Ok(PluginConfig {
            aggregator_name: self.aggregator.name.clone(),
            region: non_empty(self.aws.region.as_deref()),
            credentials: CredentialSource::from_parts(
                self.aws.access_key_id.as_deref(),
                self.aws.secret_key.as_deref(),
            ),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Aggregator selection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregatorConfig {
    /// Configuration aggregator name
    #[serde(default)]
    pub name: String,
}

/// AWS session settings
#[derive(Clone, Default, Deserialize)]
pub struct AwsSettings {
    /// Region the aggregator resides in
    pub region: Option<String>,

    /// Static access key id
    pub access_key_id: Option<String>,

    /// Static secret access key
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSettings")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("warn")
}

fn default_log_format() -> String {
    String::from("compact")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Where AWS credentials come from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Default provider chain: environment, shared profile, instance role, ...
    Ambient,
    /// Explicit access key pair
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
}

impl CredentialSource {
    /// Static credentials only when both halves are present and non-empty
    pub fn from_parts(access_key_id: Option<&str>, secret_access_key: Option<&str>) -> Self {
        match (non_empty(access_key_id), non_empty(secret_access_key)) {
            (Some(access_key_id), Some(secret_access_key)) => CredentialSource::Static {
                access_key_id,
                secret_access_key,
            },
            _ => CredentialSource::Ambient,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, CredentialSource::Static { .. })
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Ambient => write!(f, "Ambient"),
            CredentialSource::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"** redacted **")
                .finish(),
        }
    }
}

/// Resolved configuration for a single check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Non-empty aggregator name
    pub aggregator_name: String,
    /// Region override; `None` defers to the ambient region
    pub region: Option<String>,
    pub credentials: CredentialSource,
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Start from an already layered configuration
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn aggregator_name(mut self, name: impl Into<String>) -> Self {
        self.config.aggregator.name = name.into();
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.aws.region = Some(region.into());
        self
    }

    pub fn access_key_id(mut self, key: impl Into<String>) -> Self {
        self.config.aws.access_key_id = Some(key.into());
        self
    }

    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.config.aws.secret_key = Some(key.into());
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn log_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [aggregator]
            name = "org-aggregator"

            [aws]
            region = "us-west-2"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.aggregator.name, "org-aggregator");
        assert_eq!(config.aws.region.as_deref(), Some("us-west-2"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[aggregator]\nname = \"from-file\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.aggregator.name, "from-file");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = Config::from_file("/nonexistent/aggcheck.toml").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[aggregator\nname=").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_merge_vars_overrides_file() {
        let vars: HashMap<&str, &str> = [
            ("AGGCHECK_AGGREGATOR_NAME", "from-env"),
            ("AGGCHECK_LOG_LEVEL", "info"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_toml("[aggregator]\nname = \"from-file\"")
            .unwrap()
            .merge_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.aggregator.name, "from-env");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.aws.region, None);
    }

    #[test]
    fn test_builder_overrides_layered_config() {
        let layered = Config::from_toml("[aggregator]\nname = \"from-file\"").unwrap();
        let config = ConfigBuilder::from_config(layered)
            .aggregator_name("from-cli")
            .region("eu-west-1")
            .build();

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.aggregator_name, "from-cli");
        assert_eq!(resolved.region.as_deref(), Some("eu-west-1"));
        assert_eq!(resolved.credentials, CredentialSource::Ambient);
    }

    #[test]
    fn test_resolve_requires_aggregator_name() {
        let err = Config::default().resolve().unwrap_err();
        assert!(matches!(err, Error::MissingOption { ref name } if name == AGGREGATOR_NAME_OPTION));

        let err = Config::builder().aggregator_name("   ").build().resolve().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_aggregator_name_is_not_rewritten() {
        let resolved = Config::builder()
            .aggregator_name(" org-aggregator ")
            .build()
            .resolve()
            .unwrap();
        assert_eq!(resolved.aggregator_name, " org-aggregator ");
    }

    #[test]
    fn test_empty_region_defers_to_ambient() {
        let resolved = Config::builder()
            .aggregator_name("agg")
            .region("")
            .build()
            .resolve()
            .unwrap();
        assert_eq!(resolved.region, None);
    }

    #[test]
    fn test_static_credentials_need_both_halves() {
        assert!(CredentialSource::from_parts(Some("AKIAEXAMPLE"), Some("secret")).is_static());
        assert_eq!(
            CredentialSource::from_parts(Some("AKIAEXAMPLE"), None),
            CredentialSource::Ambient
        );
        assert_eq!(
            CredentialSource::from_parts(None, Some("secret")),
            CredentialSource::Ambient
        );
        assert_eq!(
            CredentialSource::from_parts(Some("AKIAEXAMPLE"), Some("")),
            CredentialSource::Ambient
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = CredentialSource::from_parts(Some("AKIAEXAMPLE"), Some("hunter2"));
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("AKIAEXAMPLE"));
        assert!(!rendered.contains("hunter2"));

        let settings = Config::builder().secret_key("hunter2").build().aws;
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}
