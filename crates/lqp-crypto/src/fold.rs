//! # Arity-8 Fold Hash
//!
//! Compresses a variable-length word array into one 32-byte digest with a
//! fixed number of words per hash invocation, so an in-circuit verifier
//! needs exactly `ceil(len / 8) + 1` compression calls for an array of
//! `len` words:
//!
//! ```text
//! acc = 0^32
//! for each chunk of 8 words (final chunk zero-padded):
//!     acc = SHA256(0x02 || acc || w0 || ... || w7)
//! fold = SHA256(0x03 || acc || word(len))
//! ```
//!
//! The length word in the finalizer keeps `[a]` and `[a, 0]` distinct even
//! though their padded chunks are identical. The empty array folds to
//! `SHA256(0x03 || 0^32 || word(0))`.

use sha2::{Digest, Sha256};

use lqp_core::error::CryptoError;
use lqp_core::Hash32;

use crate::word::{encode_scalar, encode_u64, Word, ZERO_WORD};

/// Words absorbed per compression call.
pub const FOLD_ARITY: usize = 8;

/// Domain tag for a chunk compression.
pub const TAG_FOLD_CHUNK: u8 = 0x02;

/// Domain tag for the length finalizer.
pub const TAG_FOLD_FINAL: u8 = 0x03;

/// Fold an array of pre-encoded words.
pub fn fold_words(words: &[Word]) -> Hash32 {
    let mut acc = ZERO_WORD;
    for chunk in words.chunks(FOLD_ARITY) {
        let mut hasher = Sha256::new();
        hasher.update([TAG_FOLD_CHUNK]);
        hasher.update(acc);
        for w in chunk {
            hasher.update(w);
        }
        for _ in chunk.len()..FOLD_ARITY {
            hasher.update(ZERO_WORD);
        }
        acc.copy_from_slice(&hasher.finalize());
    }
    let mut hasher = Sha256::new();
    hasher.update([TAG_FOLD_FINAL]);
    hasher.update(acc);
    hasher.update(encode_u64(words.len() as u64));
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Hash32(out)
}

/// Encode each scalar and fold.
///
/// # Errors
///
/// `WordOverflow` for the first scalar whose magnitude exceeds `u64::MAX`.
/// [`fold_scalars_indexed`] reports the offending position as well.
pub fn fold_scalars(values: &[i128]) -> Result<Hash32, CryptoError> {
    fold_scalars_indexed(values).map_err(|(_, e)| e)
}

/// Like [`fold_scalars`], but an error carries the index of the value
/// that failed to encode.
pub fn fold_scalars_indexed(values: &[i128]) -> Result<Hash32, (usize, CryptoError)> {
    let words = values
        .iter()
        .enumerate()
        .map(|(i, v)| encode_scalar(*v).map_err(|e| (i, e)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(fold_words(&words))
}

/// Fold a boolean array (each flag encoded as `0`/`1`).
pub fn fold_bools(flags: &[bool]) -> Hash32 {
    let words: Vec<Word> = flags.iter().map(|f| encode_u64(u64::from(*f))).collect();
    fold_words(&words)
}
