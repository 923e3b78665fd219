//! Aggregate compliance retrieval from AWS Config
//!
//! This crate talks to the configuration aggregator:
//! - `AwsSession`: SDK configuration built from region/credential options
//! - `ComplianceSource`: The seam between pagination and the AWS client
//! - `compliance_pages` / `collect_violations`: Lazy pagination and aggregation

pub mod aws;
pub mod compliance;

pub use aws::{AwsSession, ConfigServiceSource};
pub use compliance::{
    collect_violations, compliance_pages, violations_in_page, CompliancePage, ComplianceSource,
    RuleCompliance,
};

use aggcheck_common::PluginConfig;
use aggcheck_core::{Result, ViolationIndex};

/// Connect with the given options and collect every violation from the aggregator
pub async fn check_aggregator(config: &PluginConfig) -> Result<ViolationIndex> {
    let session = AwsSession::connect(config).await?;
    let source = session.config_service();
    collect_violations(&source, &config.aggregator_name).await
}
