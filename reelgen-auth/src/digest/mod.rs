//! Hash and keyed-hash primitives.
//!
//! - [`sha256`] - one-shot SHA-256 (FIPS 180-4)
//! - [`hmac`] - one-shot HMAC-SHA256 (RFC 2104)
//!
//! Both are pure functions: every call owns its working buffers and no state
//! survives the call, so they can be used from any number of threads at once.

pub mod hmac;
pub mod sha256;

/// Size of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Size of a SHA-256 input block in bytes.
pub const BLOCK_LEN: usize = 64;

/// A SHA-256 (or HMAC-SHA256) output.
pub type Digest = [u8; DIGEST_LEN];
