//! HMAC-SHA256 (RFC 2104) on top of [`sha256::digest`].

use zeroize::Zeroizing;

use super::{sha256, Digest, BLOCK_LEN};

/// Inner padding byte.
const IPAD: u8 = 0x36;

/// Outer padding byte.
const OPAD: u8 = 0x5c;

/// Compute HMAC-SHA256 of `message` under `key`.
///
/// Keys of any length are accepted. Keys longer than one block are hashed
/// first; shorter keys are zero-padded to the block size. Every buffer that
/// holds key-derived bytes is zeroized before this function returns.
///
/// # Example
///
/// ```
/// use reelgen_auth::digest::hmac;
///
/// let tag = hmac::mac(b"key", b"The quick brown fox jumps over the lazy dog");
/// assert_eq!(tag[..4], [0xf7, 0xbc, 0x83, 0xf4]);
/// ```
#[must_use]
pub fn mac(key: &[u8], message: &[u8]) -> Digest {
    let block_key = block_sized_key(key);

    let mut inner = Zeroizing::new(Vec::with_capacity(BLOCK_LEN + message.len()));
    inner.extend(block_key.iter().map(|b| b ^ IPAD));
    inner.extend_from_slice(message);
    let inner_hash = sha256::digest(&inner);

    let mut outer = Zeroizing::new(Vec::with_capacity(BLOCK_LEN + inner_hash.len()));
    outer.extend(block_key.iter().map(|b| b ^ OPAD));
    outer.extend_from_slice(&inner_hash);
    sha256::digest(&outer)
}

/// Reduce or zero-pad `key` to exactly one block.
fn block_sized_key(key: &[u8]) -> Zeroizing<[u8; BLOCK_LEN]> {
    let mut block = Zeroizing::new([0u8; BLOCK_LEN]);
    if key.len() > BLOCK_LEN {
        let hashed = Zeroizing::new(sha256::digest(key));
        block[..hashed.len()].copy_from_slice(hashed.as_ref());
    } else {
        block[..key.len()].copy_from_slice(key);
    }
    block
}
