//! Client error types.

use thiserror::Error;

/// Errors raised by configuration loading and the HTTP transport.
///
/// Remote rejections (`code != 0`) are not errors here: they decode into a
/// [`StatusResponse`](reelgen_core::StatusResponse) and resolve the poll.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// A required environment variable is unset or empty.
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    /// An environment variable is set but unusable.
    #[error("invalid {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    /// The configured API base URL is unusable.
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request could not be sent, timed out, or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-2xx response whose body is not a status response.
    #[error("status request failed ({status}): {body}")]
    Status { status: u16, body: String },

    /// A 2xx response whose body is not a status response.
    #[error("undecodable status response: {0}")]
    Decode(#[from] serde_json::Error),
}
