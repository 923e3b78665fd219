//! AWS session and the AWS Config compliance source

use crate::compliance::{CompliancePage, ComplianceSource, RuleCompliance, FETCH_CONTEXT};
use aggcheck_common::{CredentialSource, PluginConfig};
use aggcheck_core::{describe_chain, Error, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_config::config::Region;
use aws_sdk_config::Client as ConfigClient;
use tracing::{debug, info};

/// Provider name attached to credentials supplied on the command line
const STATIC_PROVIDER_NAME: &str = "check-aws-config-aggregator";

/// Resolved AWS SDK configuration for a run
#[derive(Debug, Clone)]
pub struct AwsSession {
    /// AWS SDK configuration
    sdk_config: SdkConfig,
}

impl AwsSession {
    /// Build an SDK configuration from the plugin options.
    ///
    /// Region and credentials fall back to the default provider chains when
    /// not given explicitly. Failing to resolve any region is a session error.
    pub async fn connect(config: &PluginConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        match &config.credentials {
            CredentialSource::Static {
                access_key_id,
                secret_access_key,
            } => {
                debug!("Using static credentials for access key {}", access_key_id);
                loader = loader.credentials_provider(Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    STATIC_PROVIDER_NAME,
                ));
            }
            CredentialSource::Ambient => {
                debug!("Using default credential provider chain");
            }
        }

        let sdk_config = loader.load().await;

        match sdk_config.region() {
            Some(region) => info!("AWS session ready in region {}", region),
            None => {
                return Err(Error::Session(
                    "no AWS region configured; pass --aws-region or set AWS_REGION".to_string(),
                ))
            }
        }

        Ok(Self { sdk_config })
    }

    /// AWS Config client bound to this session
    pub fn config_service(&self) -> ConfigServiceSource {
        ConfigServiceSource::new(ConfigClient::new(&self.sdk_config))
    }
}

/// Compliance source backed by `DescribeAggregateComplianceByConfigRules`
#[derive(Debug, Clone)]
pub struct ConfigServiceSource {
    client: ConfigClient,
}

impl ConfigServiceSource {
    pub fn new(client: ConfigClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ComplianceSource for ConfigServiceSource {
    async fn fetch_page(
        &self,
        aggregator_name: &str,
        next_token: Option<&str>,
    ) -> Result<CompliancePage> {
        let output = self
            .client
            .describe_aggregate_compliance_by_config_rules()
            .configuration_aggregator_name(aggregator_name)
            .set_next_token(next_token.map(String::from))
            .send()
            .await
            .map_err(|e| Error::request(FETCH_CONTEXT, describe_chain(&e)))?;

        let results = output
            .aggregate_compliance_by_config_rules()
            .iter()
            .map(|result| RuleCompliance {
                rule_name: result.config_rule_name().map(String::from),
                region: result.aws_region().map(String::from),
                compliance_type: result
                    .compliance()
                    .and_then(|c| c.compliance_type())
                    .map(|t| t.as_str().to_string()),
            })
            .collect();

        Ok(CompliancePage {
            results,
            next_token: output.next_token().map(String::from),
        })
    }
}
