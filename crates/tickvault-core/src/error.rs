use thiserror::Error;

use crate::http_client::HttpError;

/// Validation and contract errors exposed by `tickvault-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,

    #[error("field '{field}' must be a valid ISO-8601 date (YYYY-MM-DD): '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("field '{field}' must be a finite decimal number: '{value}'")]
    InvalidPrice { field: &'static str, value: String },

    #[error("volume must be a non-negative integer: '{value}'")]
    InvalidVolume { value: String },

    #[error("limit must be a non-zero integer, got {value}")]
    InvalidLimit { value: i64 },
    #[error("page must be a non-zero integer, got {value}")]
    InvalidPage { value: i64 },
}

/// Failures while fetching a single symbol's daily series from the provider.
///
/// These are swallowed per symbol at the ingestion boundary: one symbol's
/// fetch failure leaves that symbol out of the batch and the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(#[from] HttpError),

    #[error("provider returned HTTP status {status}")]
    UpstreamStatus { status: u16 },

    #[error("provider payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
}
