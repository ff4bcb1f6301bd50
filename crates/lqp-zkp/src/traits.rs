//! # Proof System Trait
//!
//! The boundary to the succinct-proof backend. The pipeline only needs
//! `prove(circuit) -> proof` and `verify(proof, public_output) -> bool`;
//! every backend (the native mock here, a real SNARK later) satisfies this
//! trait.
//!
//! ## Security Invariant
//!
//! `prove` must refuse an unsatisfiable circuit. A failing compliance run
//! is never encoded as a proof of failure.

use thiserror::Error;

use crate::circuit::{ConstraintViolation, LiquidityCircuit, PublicOutput};

/// Error during proof generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The witness does not satisfy the circuit.
    #[error("circuit unsatisfied: {0}")]
    Unsatisfied(#[from] ConstraintViolation),
    /// Internal prover error.
    #[error("prover error: {0}")]
    ProverError(String),
}

/// Error during proof verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The proof could not be interpreted.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
}

/// Abstract interface for a proof system over [`LiquidityCircuit`].
pub trait ProofSystem: Send + Sync {
    type Proof: Clone + Send + Sync;
    type VerifyingKey: Clone + Send + Sync;
    type ProvingKey: Send + Sync;

    /// Generate a proof for a satisfied circuit.
    fn prove(
        &self,
        pk: &Self::ProvingKey,
        circuit: &LiquidityCircuit,
    ) -> Result<Self::Proof, ProofError>;

    /// Verify a proof against its public statement.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_output: &PublicOutput,
    ) -> Result<bool, VerifyError>;
}
