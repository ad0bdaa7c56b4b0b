//! Token decoding errors.

/// Errors that can occur while parsing or decoding a token.
///
/// Issuing never fails; these only arise when reading a token back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TokenError {
    /// The token does not have exactly three non-empty segments.
    #[error("malformed token")]
    Malformed,

    /// A segment is not valid unpadded base64url.
    #[error("invalid base64url in {segment} segment")]
    InvalidEncoding { segment: &'static str },

    /// A decoded segment is not the expected JSON object.
    #[error("invalid JSON in {segment} segment")]
    InvalidJson { segment: &'static str },
}
