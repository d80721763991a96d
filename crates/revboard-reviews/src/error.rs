use thiserror::Error;

/// Errors from the upstream reviews API client.
///
/// Always recoverable at the resolver boundary: a fetch failure is logged
/// and converted into a mock fallback, never surfaced to the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure, timeout, or non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured upstream base URL does not parse.
    #[error("invalid upstream base URL: {0}")]
    InvalidBaseUrl(String),
}

/// A raw review record failed required-field or enum validation.
///
/// Batch normalization skips and logs offending records; a malformed
/// record never yields a partially-populated normalized review.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("review {review_id}: missing required field `{field}`")]
    MissingField { review_id: i64, field: &'static str },

    #[error("review {review_id}: unknown review type `{value}`")]
    UnknownReviewType { review_id: i64, value: String },

    #[error("review {review_id}: unknown status `{value}`")]
    UnknownStatus { review_id: i64, value: String },

    #[error("review {review_id}: unparseable submission timestamp `{value}`")]
    UnparseableTimestamp { review_id: i64, value: String },
}

/// Fatal errors from the review loader.
///
/// The credential variants are the configuration failures the caller must
/// render; fetch failures never appear here because the mock source
/// absorbs them.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("upstream API key is not configured; set REVBOARD_UPSTREAM_API_KEY")]
    MissingApiKey,

    #[error("upstream account id is missing or not numeric; set REVBOARD_ACCOUNT_ID")]
    InvalidAccountId,

    /// The embedded mock dataset failed to parse.
    #[error("mock review dataset is invalid: {0}")]
    MockData(#[from] serde_json::Error),
}
