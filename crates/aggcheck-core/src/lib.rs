//! Core types for the AWS Config aggregator check
//!
//! This crate provides the abstractions shared by the fetcher and the plugin binary:
//! - `Error`: Everything that can end a run early
//! - `PluginStatus`: Nagios status codes
//! - `ComplianceViolation`, `ViolationIndex`: Non-compliant rules grouped by name
//! - `report`: Turns an index into the one-line plugin output

pub mod error;
pub mod report;
pub mod status;
pub mod violation;

// Re-export commonly used types at crate root
pub use error::{describe_chain, Error, Result};
pub use report::{report, CheckOutcome};
pub use status::PluginStatus;
pub use violation::{ComplianceViolation, ViolationIndex};
