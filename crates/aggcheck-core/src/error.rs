//! Error types for the aggregator check

use crate::status::PluginStatus;
use thiserror::Error;

/// Result type alias using the check's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that terminate a check run
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("{name} is required")]
    MissingOption { name: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to parse config: {}", single_line(.0.message()))]
    Toml(#[from] toml::de::Error),

    // === Provider Errors ===
    #[error("creating session: {0}")]
    Session(String),

    #[error("{context}: {message}")]
    Request { context: String, message: String },
}

impl Error {
    /// Wrap a provider request failure with the operation it interrupted
    pub fn request(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Request {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Check if this error came from resolving options rather than talking to the provider
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingOption { .. } | Error::Configuration(_) | Error::Toml(_)
        )
    }

    /// Plugin status reported for this error. Every error is fatal.
    pub fn status(&self) -> PluginStatus {
        PluginStatus::Unknown
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingOption { .. } => "MISSING_OPTION",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::Toml(_) => "CONFIG_PARSE_ERROR",
            Error::Session(_) => "SESSION_ERROR",
            Error::Request { .. } => "REQUEST_ERROR",
        }
    }
}

/// Render an error and its sources on one line, joined with ": ".
///
/// Sources whose text already appears in the message are skipped, since
/// wrapper errors often repeat their inner error's `Display`.
pub fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = String::new();
    for cause in std::iter::successors(Some(err), |e| e.source()) {
        let text = single_line(&cause.to_string());
        if text.is_empty() || message.contains(&text) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&text);
    }
    message
}

/// Collapse a multi-line message into one line
pub fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_wraps_context() {
        let err = Error::request("retrieving aggregate compliance", "AccessDenied");
        assert_eq!(err.to_string(), "retrieving aggregate compliance: AccessDenied");
        assert_eq!(err.code(), "REQUEST_ERROR");
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_every_error_is_unknown() {
        let errors = [
            Error::MissingOption {
                name: "config-aggregator-name".into(),
            },
            Error::Session("no region".into()),
            Error::request("x", "y"),
        ];
        for err in &errors {
            assert_eq!(err.status(), PluginStatus::Unknown);
        }
        assert!(errors[0].is_configuration());
        assert_eq!(errors[0].to_string(), "config-aggregator-name is required");
    }

    #[derive(Debug)]
    struct Wrapped {
        text: &'static str,
        source: Option<Box<Wrapped>>,
    }

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.text)
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source.as_deref().map(|e| e as _)
        }
    }

    #[test]
    fn test_describe_chain_joins_sources() {
        let inner = Wrapped {
            text: "NoSuchConfigurationAggregatorException: aggregator missing",
            source: None,
        };
        let middle = Wrapped {
            text: "NoSuchConfigurationAggregatorException: aggregator missing",
            source: Some(Box::new(inner)),
        };
        let outer = Wrapped {
            text: "service error",
            source: Some(Box::new(middle)),
        };

        assert_eq!(
            describe_chain(&outer),
            "service error: NoSuchConfigurationAggregatorException: aggregator missing"
        );
    }

    #[test]
    fn test_toml_error_is_one_line() {
        let err: Error = toml::from_str::<toml::Value>("[aggregator\nname=")
            .unwrap_err()
            .into();
        let rendered = err.to_string();
        assert!(rendered.starts_with("Failed to parse config: "));
        assert_eq!(rendered.lines().count(), 1);
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\n  | b\n\n c "), "a | b c");
    }
}
