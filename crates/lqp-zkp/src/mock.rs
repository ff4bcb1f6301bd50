//! # Mock Proof System
//!
//! Executes the liquidity circuit constraints natively and, when they all
//! hold, emits `SHA256(JCS(public_output))` as the "proof". Verification
//! recomputes that digest.
//!
//! ## Security Notice
//!
//! This backend provides NO zero-knowledge privacy and no soundness
//! against a prover that skips `prove`. It pins the trait contract and
//! the refuse-to-prove behavior until a real backend is wired in.

use serde::{Deserialize, Serialize};

use lqp_core::{sha256_digest, CanonicalBytes, Hash32};

use crate::circuit::{LiquidityCircuit, PublicOutput};
use crate::traits::{ProofError, ProofSystem, VerifyError};

/// A mock proof: hex digest of the canonical public output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockProof {
    pub proof_hex: String,
}

#[derive(Debug, Clone, Default)]
pub struct MockVerifyingKey;

#[derive(Debug, Clone, Default)]
pub struct MockProvingKey;

/// Native constraint checker standing in for a proof backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProofSystem;

fn public_digest(public_output: &PublicOutput) -> Result<Hash32, String> {
    let bytes = CanonicalBytes::new(public_output).map_err(|e| e.to_string())?;
    Ok(sha256_digest(&bytes))
}

impl ProofSystem for MockProofSystem {
    type Proof = MockProof;
    type VerifyingKey = MockVerifyingKey;
    type ProvingKey = MockProvingKey;

    fn prove(
        &self,
        _pk: &Self::ProvingKey,
        circuit: &LiquidityCircuit,
    ) -> Result<Self::Proof, ProofError> {
        circuit.check_constraints()?;
        let digest = public_digest(circuit.public_output()).map_err(ProofError::ProverError)?;
        Ok(MockProof {
            proof_hex: digest.to_hex(),
        })
    }

    fn verify(
        &self,
        _vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_output: &PublicOutput,
    ) -> Result<bool, VerifyError> {
        if proof.proof_hex.len() != 64 {
            return Err(VerifyError::InvalidProof(format!(
                "expected 64 hex chars, got {}",
                proof.proof_hex.len()
            )));
        }
        let expected = public_digest(public_output).map_err(VerifyError::InvalidProof)?;
        Ok(expected.to_hex() == proof.proof_hex.to_ascii_lowercase())
    }
}
