use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_lambda::config::Region;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use aws_sdk_lambda::Client as LambdaClient;
use tracing::{debug, instrument};

use super::{InvokeOutput, Invoker};
use crate::error::{AdapterError, Result};

/// AWS Lambda implementation of [`Invoker`].
///
/// Holds a client for the region resolved at startup. Calls for another
/// region get a client built from the same shared configuration.
pub struct LambdaInvoker {
    sdk_config: SdkConfig,
    region: String,
    client: LambdaClient,
}

impl LambdaInvoker {
    /// Loads the default AWS configuration (credentials chain, retries) and
    /// binds the client to `region`.
    pub async fn new(region: &str) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_sdk_config(sdk_config, region)
    }

    pub fn from_sdk_config(sdk_config: SdkConfig, region: &str) -> Self {
        let client = build_client(&sdk_config, region);
        Self {
            sdk_config,
            region: region.to_string(),
            client,
        }
    }

    fn client_for(&self, region: &str) -> LambdaClient {
        if region == self.region {
            self.client.clone()
        } else {
            build_client(&self.sdk_config, region)
        }
    }
}

fn build_client(sdk_config: &SdkConfig, region: &str) -> LambdaClient {
    let config = aws_sdk_lambda::config::Builder::from(sdk_config)
        .region(Region::new(region.to_string()))
        .build();
    LambdaClient::from_conf(config)
}

#[async_trait]
impl Invoker for LambdaInvoker {
    #[instrument(skip(self, payload))]
    async fn invoke(
        &self,
        region: &str,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvokeOutput> {
        let response = self
            .client_for(region)
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| {
                AdapterError::Invoke(format!(
                    "Lambda invocation error: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let output = InvokeOutput {
            status_code: response.status_code(),
            function_error: response.function_error().map(str::to_string),
            payload: response
                .payload()
                .map(|blob| blob.as_ref().to_vec())
                .unwrap_or_default(),
        };
        debug!(
            status_code = output.status_code,
            payload_size = output.payload.len(),
            "Lambda invocation returned"
        );
        Ok(output)
    }
}
