use std::time::Duration;

use async_trait::async_trait;
use aws_config::imds::{self, client::error::ImdsError};
use tracing::{debug, info};

use crate::error::{AdapterError, Result};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const REGION_ENV_VAR: &str = "AWS_REGION";

const REGION_PATH: &str = "/latest/meta-data/placement/region";
const METADATA_TIMEOUT: Duration = Duration::from_secs(1);

/// Capability that decides which AWS region backend calls go to.
#[async_trait]
pub trait RegionResolver: Send + Sync {
    async fn resolve(&self) -> Result<String>;
}

/// Always returns the region it was built with.
#[derive(Debug, Clone)]
pub struct StaticRegion(pub String);

#[async_trait]
impl RegionResolver for StaticRegion {
    async fn resolve(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Metadata service first, then `AWS_REGION`, then `us-east-1`.
///
/// The metadata service counts as unavailable when no session token can be
/// obtained or the connection fails. Once it answers, its reply is
/// authoritative: an error response is fatal rather than a fallback.
#[derive(Debug, Clone)]
pub struct DefaultRegionResolver {
    metadata: imds::Client,
    env_region: Option<String>,
}

impl DefaultRegionResolver {
    pub fn from_env() -> Self {
        Self {
            metadata: metadata_client().build(),
            env_region: std::env::var(REGION_ENV_VAR).ok(),
        }
    }

    /// Resolver against a metadata service at `endpoint` instead of the
    /// link-local default.
    pub fn with_endpoint(endpoint: &str, env_region: Option<String>) -> Result<Self> {
        let metadata = metadata_client()
            .endpoint(endpoint)
            .map_err(|e| {
                AdapterError::Region(format!("invalid metadata endpoint '{}': {}", endpoint, e))
            })?
            .build();
        Ok(Self {
            metadata,
            env_region,
        })
    }

    fn fallback_region(&self) -> String {
        self.env_region
            .as_deref()
            .filter(|region| !region.is_empty())
            .unwrap_or(DEFAULT_REGION)
            .to_string()
    }
}

fn metadata_client() -> imds::client::Builder {
    imds::Client::builder()
        .max_attempts(1)
        .connect_timeout(METADATA_TIMEOUT)
        .read_timeout(METADATA_TIMEOUT)
}

#[async_trait]
impl RegionResolver for DefaultRegionResolver {
    async fn resolve(&self) -> Result<String> {
        match self.metadata.get(REGION_PATH).await {
            Ok(region) => {
                let region = region.as_ref().trim();
                if region.is_empty() {
                    return Err(AdapterError::Region(
                        "metadata service returned an empty region".to_string(),
                    ));
                }
                info!(region = %region, "Resolved region from instance metadata");
                Ok(region.to_string())
            }
            Err(ImdsError::FailedToLoadToken(_)) | Err(ImdsError::IoError(_)) => {
                debug!("Instance metadata unavailable, falling back to environment");
                Ok(self.fallback_region())
            }
            Err(e) => Err(AdapterError::Region(format!(
                "Failed to fetch region from metadata service: {}",
                e
            ))),
        }
    }
}
