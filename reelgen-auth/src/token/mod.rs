//! Compact HS256 bearer tokens.
//!
//! A token is three base64url segments (no padding) joined by `.`:
//!
//! ```text
//! <b64url({"alg":"HS256","typ":"JWT"})>.<b64url({"iss":..,"exp":..,"nbf":..})>.<b64url(hmac)>
//! ```
//!
//! The signature is HMAC-SHA256 over the ASCII bytes of the first two
//! segments joined by `.`. Tokens are self-describing: [`Token::decode`]
//! reads the header and claims without the key. This crate only issues
//! tokens; verification is the remote service's job.

mod claims;
mod error;
mod signer;

pub use claims::{Claims, Header, TokenPolicy};
pub use error::TokenError;
pub use signer::{issue, Token, TokenSigner};
