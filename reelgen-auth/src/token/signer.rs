//! Token issuance and the [`Token`] type.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::digest::{hmac, Digest, DIGEST_LEN};

use super::{Claims, Header, TokenError, TokenPolicy};

/// Issue a token for `issuer` at `now` (Unix seconds) with the default policy.
///
/// Equivalent to `TokenSigner::default().issue(key, issuer, now)`.
#[must_use]
pub fn issue(key: &[u8], issuer: &str, now: i64) -> Token {
    TokenSigner::default().issue(key, issuer, now)
}

/// Issues HS256 tokens under a fixed [`TokenPolicy`].
///
/// The signer holds no key material; the key is borrowed for the duration of
/// each [`issue`](Self::issue) call only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenSigner {
    policy: TokenPolicy,
}

impl TokenSigner {
    /// Create a signer with the given validity policy.
    #[must_use]
    pub fn new(policy: TokenPolicy) -> Self {
        Self { policy }
    }

    /// The policy applied to issued tokens.
    #[must_use]
    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// Issue a signed token.
    ///
    /// # Arguments
    /// * `key` - HMAC secret, any length
    /// * `issuer` - value of the `iss` claim
    /// * `now` - issuance time in Unix seconds
    #[must_use]
    pub fn issue(&self, key: &[u8], issuer: &str, now: i64) -> Token {
        let header = encode_segment(&Header::hs256());
        let claims = encode_segment(&Claims::new(issuer, now, &self.policy));
        let claims_start = header.len() + 1;
        let signature_start = claims_start + claims.len() + 1;

        let mut raw = format!("{header}.{claims}");
        let signature = hmac::mac(key, raw.as_bytes());
        raw.push('.');
        URL_SAFE_NO_PAD.encode_string(signature, &mut raw);

        Token {
            raw,
            claims_start,
            signature_start,
        }
    }
}

/// Serialize a record as compact JSON and base64url-encode it.
fn encode_segment<T: Serialize>(value: &T) -> String {
    // Header and Claims hold only strings and integers
    let json = serde_json::to_vec(value).expect("token records always serialize to JSON");
    URL_SAFE_NO_PAD.encode(json)
}

fn decode_segment<T: DeserializeOwned>(
    segment: &str,
    name: &'static str,
) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::InvalidEncoding { segment: name })?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::InvalidJson { segment: name })
}

/// A signed `header.claims.signature` token.
///
/// Construct one with [`TokenSigner::issue`] or read one back with
/// [`Token::parse`]. Tokens are immutable.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    raw: String,
    /// Byte offset of the claims segment.
    claims_start: usize,
    /// Byte offset of the signature segment.
    signature_start: usize,
}

impl Token {
    /// Parse a token string.
    ///
    /// Checks the shape only: three non-empty, correctly encoded segments and
    /// a signature of HMAC-SHA256 length. The signature is not verified.
    ///
    /// # Errors
    /// Returns [`TokenError::Malformed`] for a wrong segment count, an empty
    /// segment or a signature of the wrong length, and
    /// [`TokenError::InvalidEncoding`] if a segment is not unpadded base64url.
    pub fn parse(encoded: &str) -> Result<Self, TokenError> {
        let mut segments = encoded.split('.');
        let (Some(header), Some(claims), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        if header.is_empty() || claims.is_empty() || signature.is_empty() {
            return Err(TokenError::Malformed);
        }

        for (segment, name) in [(header, "header"), (claims, "claims")] {
            URL_SAFE_NO_PAD
                .decode(segment)
                .map_err(|_| TokenError::InvalidEncoding { segment: name })?;
        }
        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::InvalidEncoding { segment: "signature" })?;
        if signature_bytes.len() != DIGEST_LEN {
            return Err(TokenError::Malformed);
        }

        Ok(Self {
            raw: encoded.to_string(),
            claims_start: header.len() + 1,
            signature_start: header.len() + claims.len() + 2,
        })
    }

    /// Decode the header and claims without checking the signature.
    ///
    /// # Errors
    /// Returns [`TokenError::InvalidJson`] if either segment is not the
    /// expected JSON record.
    pub fn decode(&self) -> Result<(Header, Claims), TokenError> {
        let header = decode_segment(self.header_segment(), "header")?;
        let claims = decode_segment(self.claims_segment(), "claims")?;
        Ok((header, claims))
    }

    /// Decode only the claims.
    ///
    /// # Errors
    /// See [`decode`](Self::decode).
    pub fn claims(&self) -> Result<Claims, TokenError> {
        decode_segment(self.claims_segment(), "claims")
    }

    /// The raw signature bytes.
    ///
    /// # Errors
    /// Cannot fail for tokens built by [`TokenSigner::issue`] or accepted by
    /// [`Token::parse`]; the `Result` mirrors the other accessors.
    pub fn signature(&self) -> Result<Digest, TokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.signature_segment())
            .map_err(|_| TokenError::InvalidEncoding { segment: "signature" })?;
        bytes.try_into().map_err(|_| TokenError::Malformed)
    }

    /// The encoded header segment.
    #[must_use]
    pub fn header_segment(&self) -> &str {
        &self.raw[..self.claims_start - 1]
    }

    /// The encoded claims segment.
    #[must_use]
    pub fn claims_segment(&self) -> &str {
        &self.raw[self.claims_start..self.signature_start - 1]
    }

    /// The encoded signature segment.
    #[must_use]
    pub fn signature_segment(&self) -> &str {
        &self.raw[self.signature_start..]
    }

    /// The bytes the signature covers: `header.claims`.
    #[must_use]
    pub fn signing_input(&self) -> &str {
        &self.raw[..self.signature_start - 1]
    }

    /// The full token string, suitable for an `Authorization: Bearer` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Consume the token and return the full token string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.raw
    }
}

impl std::str::FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // A token is a live credential; keep the signature out of logs
        write!(f, "Token({}.[signature])", self.signing_input())
    }
}
