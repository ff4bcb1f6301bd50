//! # Fixed-Width Word Encoding
//!
//! Every scalar that enters a commitment (amounts, ratios, counts, codes,
//! flags) is first encoded as a 32-byte word:
//!
//! ```text
//! byte  0        sign: 0x00 non-negative, 0x01 negative
//! bytes 1..24    zero
//! bytes 24..32   magnitude, big-endian u64
//! ```
//!
//! The layout is trivial to reproduce in a constrained-arithmetic circuit:
//! one boolean and one 64-bit range check per scalar. A magnitude that does
//! not fit in 64 bits is rejected, never truncated.

use lqp_core::error::CryptoError;
use lqp_core::Hash32;

/// Width of an encoded word in bytes.
pub const WORD_LEN: usize = 32;

/// A 32-byte encoded scalar.
pub type Word = [u8; WORD_LEN];

/// The all-zero word (encodes `0` and `false`, and pads short fold chunks).
pub const ZERO_WORD: Word = [0u8; WORD_LEN];

/// Encode a signed scalar.
///
/// # Errors
///
/// [`CryptoError::WordOverflow`] if `|value| > u64::MAX`.
pub fn encode_scalar(value: i128) -> Result<Word, CryptoError> {
    let magnitude =
        u64::try_from(value.unsigned_abs()).map_err(|_| CryptoError::WordOverflow(value))?;
    let mut word = ZERO_WORD;
    if value < 0 {
        word[0] = 0x01;
    }
    word[24..].copy_from_slice(&magnitude.to_be_bytes());
    Ok(word)
}

/// Encode an unsigned scalar. Infallible: every `u64` fits.
pub fn encode_u64(value: u64) -> Word {
    let mut word = ZERO_WORD;
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encode a flag as `0` or `1`.
pub fn encode_bool(flag: bool) -> Word {
    encode_u64(u64::from(flag))
}

/// A digest is already 32 bytes and is used as a word verbatim.
pub fn encode_hash(hash: &Hash32) -> Word {
    hash.0
}

/// Decode a word back to its signed scalar.
///
/// Rejects words with a sign byte other than 0/1, non-zero padding, or a
/// negative zero, so that decoding is the exact inverse of [`encode_scalar`].
pub fn decode_scalar(word: &Word) -> Result<i128, CryptoError> {
    if word[1..24].iter().any(|b| *b != 0) {
        return Err(CryptoError::WordDecoding("word padding is not zero".into()));
    }
    let mut mag = [0u8; 8];
    mag.copy_from_slice(&word[24..]);
    let magnitude = i128::from(u64::from_be_bytes(mag));
    match word[0] {
        0x00 => Ok(magnitude),
        0x01 if magnitude != 0 => Ok(-magnitude),
        0x01 => Err(CryptoError::WordDecoding("negative zero word".into())),
        other => Err(CryptoError::WordDecoding(format!("invalid sign byte {other:#04x}"))),
    }
}
