//! # Error Types
//!
//! `LiquidityError` is the taxonomy every pipeline stage (normalization,
//! classification, metric computation, commitment) reports through. Each
//! variant carries enough context (contract id, period index, offending
//! value) to diagnose a failure without re-running the pipeline.
//!
//! None of these errors is retried: they are deterministic functions of
//! the input, so a retry would fail identically.

use thiserror::Error;

/// Pipeline error taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiquidityError {
    /// The event set is empty (no contracts, or contracts without events).
    #[error("no data: {reason}")]
    NoData {
        /// What was empty.
        reason: String,
    },

    /// Configuration is inconsistent with the data or with itself.
    #[error("configuration mismatch{}: {reason}", fmt_period(*.period))]
    ConfigMismatch {
        /// Human-readable description of the inconsistency.
        reason: String,
        /// Period index the mismatch was detected at, if any.
        period: Option<usize>,
    },

    /// Unknown regulatory framework or policy name.
    #[error("unsupported framework: {0}")]
    UnsupportedFramework(String),

    /// A value exceeds the range the commitment encoding can represent.
    #[error("encoding overflow in {field}{}: value {value}", fmt_period(*.period))]
    EncodingOverflow {
        /// Which array or scalar overflowed.
        field: String,
        /// Period index of the offending value, if any.
        period: Option<usize>,
        /// The offending value in minor units.
        value: i128,
    },

    /// An input record could not be interpreted.
    #[error("invalid input for contract {contract_id}: {reason}")]
    InvalidInput {
        /// Contract the record belongs to.
        contract_id: String,
        /// What was wrong.
        reason: String,
    },

    /// An internal conservation law was broken.
    #[error("invariant violation at period {period}: {reason}")]
    InvariantViolation {
        /// Period index where the law failed.
        period: usize,
        /// Which law.
        reason: String,
    },

    /// Canonical serialization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

fn fmt_period(period: Option<usize>) -> String {
    match period {
        Some(p) => format!(" at period {p}"),
        None => String::new(),
    }
}

impl LiquidityError {
    /// Shorthand for a `ConfigMismatch` not tied to a period.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigMismatch {
            reason: reason.into(),
            period: None,
        }
    }

    /// Shorthand for an `EncodingOverflow` raised by arithmetic on `field`.
    pub fn overflow(field: impl Into<String>, period: Option<usize>, value: i128) -> Self {
        Self::EncodingOverflow {
            field: field.into(),
            period,
            value,
        }
    }

    /// Shorthand for an `InvalidInput` on a contract.
    pub fn invalid_input(contract_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            contract_id: contract_id.into(),
            reason: reason.into(),
        }
    }
}

/// Error during canonical serialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// Floats have no canonical rendering; amounts must be integers or strings.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(FloatBits),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),
}

impl From<serde_json::Error> for CanonicalizationError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationFailed(e.to_string())
    }
}

/// A rejected float, stored by bit pattern so the error stays `Eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatBits(u64);

impl From<f64> for FloatBits {
    fn from(f: f64) -> Self {
        Self(f.to_bits())
    }
}

impl PartialEq<f64> for FloatBits {
    fn eq(&self, other: &f64) -> bool {
        self.0 == other.to_bits()
    }
}

impl std::fmt::Display for FloatBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", f64::from_bits(self.0))
    }
}

/// Error in cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest parsing or computation failed.
    #[error("digest error: {0}")]
    DigestError(String),

    /// A scalar does not fit the fixed-width word encoding.
    #[error("word encoding overflow: {0}")]
    WordOverflow(i128),

    /// A word is not a canonical scalar encoding.
    #[error("word decoding failed: {0}")]
    WordDecoding(String),

    /// A Merkle operation was given out-of-range input.
    #[error("merkle error: {0}")]
    Merkle(String),
}
