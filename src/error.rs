use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Invoke(String),

    #[error("{0}")]
    Encode(String),

    #[error("Region error: {0}")]
    Region(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdapterError {
    /// Pipeline stage the error belongs to, used as a metric label.
    pub fn stage(&self) -> &'static str {
        match self {
            AdapterError::Decode(_) => "decode",
            AdapterError::Validation(_) => "validate",
            AdapterError::Invoke(_) => "invoke",
            AdapterError::Encode(_) => "encode",
            AdapterError::Region(_) => "region",
            AdapterError::Config(_) => "config",
            AdapterError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // Backend failures are reported as client errors, matching what
            // remote-read callers of this adapter already rely on.
            AdapterError::Decode(_) | AdapterError::Validation(_) | AdapterError::Invoke(_) => {
                StatusCode::BAD_REQUEST
            }
            AdapterError::Encode(_)
            | AdapterError::Region(_)
            | AdapterError::Config(_)
            | AdapterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<snap::Error> for AdapterError {
    fn from(err: snap::Error) -> Self {
        AdapterError::Decode(err.to_string())
    }
}

impl From<prost::DecodeError> for AdapterError {
    fn from(err: prost::DecodeError) -> Self {
        AdapterError::Decode(err.to_string())
    }
}

impl From<prost::EncodeError> for AdapterError {
    fn from(err: prost::EncodeError) -> Self {
        AdapterError::Encode(err.to_string())
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
