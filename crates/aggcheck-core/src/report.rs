//! Rendering of a violation index into a plugin status line

use crate::error::{single_line, Error};
use crate::status::PluginStatus;
use crate::violation::ViolationIndex;

/// Message reported when the aggregator has no non-compliant rules
pub const NO_VIOLATIONS_MESSAGE: &str = "No resources found out of compliance";

/// Prefix of the message reported when violations exist
pub const VIOLATIONS_PREFIX: &str = "Non-compliant resources detected in the following regions:";

/// Final result of a check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub status: PluginStatus,
    pub message: String,
}

impl CheckOutcome {
    pub fn new(status: PluginStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Outcome for a run that ended in an error, always a single line
    pub fn fatal(err: &Error) -> Self {
        Self::new(err.status(), single_line(&err.to_string()))
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.status, self.message)
    }
}

/// Build the outcome for a completed fetch.
///
/// Rules are listed in lexicographic order, each with its regions sorted, so
/// the same index always yields the same line.
pub fn report(index: &ViolationIndex) -> CheckOutcome {
    if index.is_empty() {
        return CheckOutcome::new(PluginStatus::Ok, NO_VIOLATIONS_MESSAGE);
    }

    let rules: Vec<String> = index
        .sorted()
        .into_iter()
        .map(|(rule, regions)| format!("{}=[{}]", rule, regions.join(",")))
        .collect();

    CheckOutcome::new(
        PluginStatus::Critical,
        format!("{} {}", VIOLATIONS_PREFIX, rules.join(" ")),
    )
}
