//! Bearer credential issuance for the reelgen video API.
//!
//! This crate is intentionally IO-free:
//! - No filesystem operations
//! - No network calls
//! - No clock reads (callers pass `now` explicitly)
//! - No logging
//!
//! It is built in three layers, leaves first:
//! - [`digest::sha256`] - SHA-256 from its padding rule and compression function
//! - [`digest::hmac`] - HMAC-SHA256 on top of the hash
//! - [`token`] - compact `header.claims.signature` tokens signed with HMAC-SHA256
//!
//! # Example
//!
//! ```
//! use reelgen_auth::token;
//!
//! let token = token::issue(b"secret-key", "access-key-id", 1_700_000_000);
//! let (header, claims) = token.decode().unwrap();
//! assert_eq!(header.alg, "HS256");
//! assert_eq!(claims.iss, "access-key-id");
//! assert_eq!(claims.exp - claims.nbf, 1805);
//! ```

pub mod digest;
pub mod token;

pub use digest::{hmac::mac, sha256::digest, Digest, BLOCK_LEN, DIGEST_LEN};
pub use token::{issue, Claims, Header, Token, TokenError, TokenPolicy, TokenSigner};
