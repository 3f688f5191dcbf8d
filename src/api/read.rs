use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{error, info_span, Instrument};

use super::AppState;
use crate::{
    backend::invoke_backend,
    codec::{
        decode_read_request, encode_read_response, CONTENT_ENCODING_SNAPPY, CONTENT_TYPE_PROTOBUF,
    },
    mapper::map_series,
    metrics::{record_failure, record_series_returned, RequestTimer},
    proto::{QueryResult, ReadResponse},
    query::extract_params,
    AdapterError, Result,
};

pub const ONE_QUERY_ONLY: &str = "Can only handle one query.";

pub(super) async fn remote_read(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let _timer = RequestTimer::new();

    match read(&state, &body).instrument(info_span!("remote_read")).await {
        Ok(compressed) => Ok((
            [
                (header::CONTENT_TYPE, CONTENT_TYPE_PROTOBUF),
                (header::CONTENT_ENCODING, CONTENT_ENCODING_SNAPPY),
            ],
            compressed,
        )
            .into_response()),
        Err(e) => {
            record_failure(e.stage());
            error!(stage = e.stage(), error = %e, "Remote read failed");
            Err(e)
        }
    }
}

/// Runs one remote-read request body through the whole pipeline and returns
/// the compressed response body.
pub async fn read(state: &AppState, body: &[u8]) -> Result<Vec<u8>> {
    let request = decode_read_request(body)?;
    let [query] = request.queries.as_slice() else {
        return Err(AdapterError::Validation(ONE_QUERY_ONLY.to_string()));
    };

    let params = extract_params(&query.matchers)?;
    let series = invoke_backend(
        state.invoker.as_ref(),
        &state.region,
        &params,
        query.start_timestamp_ms,
        query.end_timestamp_ms,
    )
    .await?;

    let timeseries = map_series(&series, &params);
    record_series_returned(timeseries.len());

    let response = ReadResponse {
        results: vec![QueryResult { timeseries }],
    };
    encode_read_response(&response)
}
