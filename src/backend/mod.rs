use std::time::Instant;

use async_trait::async_trait;
use chrono::{SecondsFormat, TimeZone, Utc};
use tracing::{debug, instrument};

use crate::error::{AdapterError, Result};
use crate::metrics::BACKEND_INVOKE_DURATION;
use crate::models::{BackendRequest, BackendResponse, TimeRange, Targets};
use crate::query::ExtractedParams;

pub mod lambda;

pub use lambda::LambdaInvoker;

/// Status code of a successful synchronous invocation.
pub const INVOKE_OK: i32 = 200;

/// Raw result of a backend invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeOutput {
    pub status_code: i32,
    /// Set when the function itself failed while handling the call.
    pub function_error: Option<String>,
    pub payload: Vec<u8>,
}

/// Capability to run a named backend function with a JSON payload.
///
/// Implementations carry their own timeouts; callers wait for the reply.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(
        &self,
        region: &str,
        function_name: &str,
        payload: Vec<u8>,
    ) -> Result<InvokeOutput>;
}

/// Formats an epoch-millisecond instant as RFC3339 in UTC, dropping the
/// sub-second part.
pub fn format_timestamp(ms: i64) -> Result<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| AdapterError::Validation(format!("timestamp {} ms out of range", ms)))
}

pub fn build_request(
    params: &ExtractedParams,
    start_ms: i64,
    end_ms: i64,
) -> Result<BackendRequest> {
    Ok(BackendRequest {
        range: TimeRange {
            from: format_timestamp(start_ms)?,
            to: format_timestamp(end_ms)?,
        },
        targets: Targets {
            target: params.target.clone(),
            r#type: params.r#type.clone(),
        },
    })
}

/// Invokes the backend function named in `params` and parses its series.
#[instrument(skip(invoker, params), fields(function_name = %params.function_name))]
pub async fn invoke_backend(
    invoker: &dyn Invoker,
    region: &str,
    params: &ExtractedParams,
    start_ms: i64,
    end_ms: i64,
) -> Result<BackendResponse> {
    let request = build_request(params, start_ms, end_ms)?;
    let payload = serde_json::to_vec(&request)
        .map_err(|e| AdapterError::Internal(format!("JSON serialization error: {}", e)))?;
    debug!(payload_size = payload.len(), "Invoking backend function");

    let start = Instant::now();
    let result = invoker
        .invoke(region, &params.function_name, payload)
        .await
        .and_then(parse_output);
    let outcome = if result.is_ok() { "success" } else { "failure" };
    BACKEND_INVOKE_DURATION
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());

    let series = result?;
    debug!(series = series.len(), "Backend invocation completed");
    Ok(series)
}

fn parse_output(output: InvokeOutput) -> Result<BackendResponse> {
    if output.status_code != INVOKE_OK {
        return Err(AdapterError::Invoke(format!(
            "backend returned status code {}",
            output.status_code
        )));
    }

    if let Some(error) = output.function_error {
        return Err(AdapterError::Invoke(format!(
            "backend function error: {}: {}",
            error,
            String::from_utf8_lossy(&output.payload)
        )));
    }

    // A bare `null` reply means no series.
    let series: Option<BackendResponse> = serde_json::from_slice(&output.payload)
        .map_err(|e| AdapterError::Invoke(format!("malformed backend reply: {}", e)))?;
    Ok(series.unwrap_or_default())
}
