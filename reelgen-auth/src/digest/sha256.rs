//! SHA-256 built from its message padding rule and compression function.
//!
//! Output is bit-exact with FIPS 180-4: the remote API verifies our HMAC
//! signatures with a stock implementation, so any deviation here shows up as
//! a rejected credential rather than a local failure.

use super::{Digest, BLOCK_LEN, DIGEST_LEN};

/// Initial hash value H(0): the first 32 bits of the fractional parts of the
/// square roots of the first 8 primes.
const IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Round constants: the first 32 bits of the fractional parts of the cube
/// roots of the first 64 primes.
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Length of the big-endian bit-count trailer appended during padding.
const LENGTH_TRAILER_LEN: usize = 8;

/// Compute the SHA-256 digest of `message`.
///
/// Any byte length is valid input, including the empty slice.
///
/// # Example
///
/// ```
/// use reelgen_auth::digest::sha256;
///
/// let digest = sha256::digest(b"abc");
/// assert_eq!(digest[..4], [0xba, 0x78, 0x16, 0xbf]);
/// ```
#[must_use]
pub fn digest(message: &[u8]) -> Digest {
    let mut state = IV;
    for block in pad(message).chunks_exact(BLOCK_LEN) {
        compress(&mut state, block);
    }

    let mut out = [0u8; DIGEST_LEN];
    for (chunk, word) in out.chunks_exact_mut(4).zip(state) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}

/// Apply the SHA-256 padding rule.
///
/// Appends `0x80`, then zero bytes until the length is 56 mod 64, then the
/// original length in bits as a big-endian u64. The result is always a
/// non-empty multiple of [`BLOCK_LEN`].
pub(crate) fn pad(message: &[u8]) -> Vec<u8> {
    let zeros = (BLOCK_LEN + BLOCK_LEN - LENGTH_TRAILER_LEN - 1 - message.len() % BLOCK_LEN)
        % BLOCK_LEN;
    let bit_len = (message.len() as u64).wrapping_mul(8);

    let mut padded = Vec::with_capacity(message.len() + 1 + zeros + LENGTH_TRAILER_LEN);
    padded.extend_from_slice(message);
    padded.push(0x80);
    padded.resize(padded.len() + zeros, 0);
    padded.extend_from_slice(&bit_len.to_be_bytes());
    padded
}

/// Fold one 64-byte block into the running state.
fn compress(state: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_LEN);

    // Message schedule
    let mut w = [0u32; 64];
    for (t, word) in block.chunks_exact(4).enumerate() {
        w[t] = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
    }
    for t in 16..64 {
        let s0 = w[t - 15].rotate_right(7) ^ w[t - 15].rotate_right(18) ^ (w[t - 15] >> 3);
        let s1 = w[t - 2].rotate_right(17) ^ w[t - 2].rotate_right(19) ^ (w[t - 2] >> 10);
        w[t] = w[t - 16]
            .wrapping_add(s0)
            .wrapping_add(w[t - 7])
            .wrapping_add(s1);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for t in 0..64 {
        let big_sigma1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let ch = (e & f) ^ (!e & g);
        let t1 = h
            .wrapping_add(big_sigma1)
            .wrapping_add(ch)
            .wrapping_add(K[t])
            .wrapping_add(w[t]);

        let big_sigma0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let maj = (a & b) ^ (a & c) ^ (b & c);
        let t2 = big_sigma0.wrapping_add(maj);

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (word, add) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *word = word.wrapping_add(add);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_lengths_are_block_multiples() {
        for len in 0..200 {
            let padded = pad(&vec![0xab; len]);
            assert_eq!(padded.len() % BLOCK_LEN, 0, "len {len}");
            assert!(padded.len() >= len + 1 + LENGTH_TRAILER_LEN, "len {len}");
            // Never more than one block of overhead beyond the minimum.
            assert!(padded.len() < len + 1 + LENGTH_TRAILER_LEN + BLOCK_LEN, "len {len}");
        }
    }

    #[test]
    fn test_padding_boundaries() {
        // 55 bytes is the longest message that pads into a single block
        assert_eq!(pad(&[0u8; 55]).len(), 64);
        // 56 bytes leaves no room for the trailer and spills into a second block
        assert_eq!(pad(&[0u8; 56]).len(), 128);
        assert_eq!(pad(&[0u8; 64]).len(), 128);
        assert_eq!(pad(&[]).len(), 64);
    }

    #[test]
    fn test_padding_layout() {
        let padded = pad(b"abc");

        assert_eq!(&padded[..3], b"abc");
        assert_eq!(padded[3], 0x80);
        assert!(padded[4..56].iter().all(|b| *b == 0));
        // 3 bytes = 24 bits, big-endian
        assert_eq!(&padded[56..], &24u64.to_be_bytes());
    }

    #[test]
    fn test_empty_message() {
        let expected = [
            0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f,
            0xb9, 0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b,
            0x78, 0x52, 0xb8, 0x55,
        ];
        assert_eq!(digest(b""), expected);
    }

    #[test]
    fn test_abc() {
        let expected = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
            0xf2, 0x00, 0x15, 0xad,
        ];
        assert_eq!(digest(b"abc"), expected);
    }

    #[test]
    fn test_deterministic() {
        let message = b"image2video task status";
        assert_eq!(digest(message), digest(message));
    }
}
