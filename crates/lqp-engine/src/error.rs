//! # Engine Errors
//!
//! One wrapper over the stage errors, so a caller can match on where a run
//! stopped without losing the stage's own context.

use thiserror::Error;

use lqp_core::error::CryptoError;
use lqp_core::LiquidityError;
use lqp_state::StateError;
use lqp_zkp::ProofError;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Normalization, classification, metrics or encoding failed.
    #[error(transparent)]
    Pipeline(#[from] LiquidityError),

    /// A freshly built commitment failed its own opening check.
    #[error("commitment self-check failed: {0}")]
    Commitment(#[from] CryptoError),

    #[error("proof generation failed: {0}")]
    Proof(#[from] ProofError),

    #[error("settlement failed: {0}")]
    Settlement(#[from] StateError),
}

impl EngineError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pipeline(e) => match e {
                LiquidityError::NoData { .. } => "no_data",
                LiquidityError::ConfigMismatch { .. } => "config_mismatch",
                LiquidityError::UnsupportedFramework(_) => "unsupported_framework",
                LiquidityError::EncodingOverflow { .. } => "encoding_overflow",
                LiquidityError::InvalidInput { .. } => "invalid_input",
                LiquidityError::InvariantViolation { .. } => "invariant_violation",
                LiquidityError::Canonicalization(_) => "canonicalization",
            },
            Self::Commitment(_) => "commitment",
            Self::Proof(_) => "proof",
            Self::Settlement(_) => "settlement",
        }
    }
}
