//! Token header and claims records.

use serde::{Deserialize, Serialize};

/// The fixed JOSE header carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Signing algorithm, always `HS256`.
    pub alg: String,
    /// Token type, always `JWT`.
    pub typ: String,
}

impl Header {
    /// The header for HMAC-SHA256 signed tokens.
    #[must_use]
    pub fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried in the token payload.
///
/// Field order is the serialization order: `iss`, `exp`, `nbf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer (the API access key id).
    pub iss: String,
    /// Expiration time (Unix seconds).
    pub exp: i64,
    /// Not-before time (Unix seconds).
    pub nbf: i64,
}

impl Claims {
    /// Build claims for a token issued at `now` (Unix seconds) under `policy`.
    #[must_use]
    pub fn new(issuer: &str, now: i64, policy: &TokenPolicy) -> Self {
        Self {
            iss: issuer.to_string(),
            exp: now.saturating_add(policy.validity_seconds),
            nbf: now.saturating_sub(policy.not_before_skew_seconds),
        }
    }

    /// Whether the claims accept `now` (Unix seconds): `nbf <= now < exp`.
    #[must_use]
    pub fn is_current(&self, now: i64) -> bool {
        self.nbf <= now && now < self.exp
    }
}

/// Validity window applied when issuing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Seconds from issuance until `exp`.
    pub validity_seconds: i64,
    /// Seconds `nbf` is backdated to tolerate clock skew on the verifier.
    pub not_before_skew_seconds: i64,
}

impl TokenPolicy {
    /// Default validity window (30 minutes).
    pub const DEFAULT_VALIDITY_SECONDS: i64 = 1800;

    /// Default not-before backdating.
    pub const DEFAULT_NOT_BEFORE_SKEW_SECONDS: i64 = 5;
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            validity_seconds: Self::DEFAULT_VALIDITY_SECONDS,
            not_before_skew_seconds: Self::DEFAULT_NOT_BEFORE_SKEW_SECONDS,
        }
    }
}
