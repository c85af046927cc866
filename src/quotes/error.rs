use thiserror::Error;

use crate::error::CoreError;

/// Errors a `QuoteSource` can report.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Network failure, timeout or TLS error.
    #[error("quote request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The provider reported an error inside a 200 response.
    #[error("provider error: {0}")]
    Api(String),

    /// The payload did not have the expected shape.
    #[error("unexpected payload: {0}")]
    Decode(String),

    /// The source has no value for this input.
    #[error("{0} not available")]
    Missing(String),
}

impl From<QuoteError> for CoreError {
    fn from(e: QuoteError) -> Self {
        CoreError::UpstreamUnavailable(e.to_string())
    }
}
