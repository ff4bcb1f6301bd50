//! # Liquidity Compliance Circuit
//!
//! Data model and native constraint evaluation for the statement
//!
//! > "I know classified cash-flow data whose commitment root is `root`,
//! > which an oracle holding `oracle_public_key` signed, and whose metrics
//! > meet `thresholds` in every period."
//!
//! Public inputs are [`PublicOutput`]. The classified data, metrics,
//! scenario identifier and oracle signature are the private witness.
//!
//! ## Constraints
//!
//! 1. Public, threshold and witness frameworks agree.
//! 2. Re-encoding the witness reproduces the public root.
//! 3. The oracle signature over the root verifies.
//! 4. Metrics recomputed from the witness and the public thresholds equal
//!    the committed metrics, and the public flag equals the witness flag.
//! 5. `overall_compliant` is asserted true. A failing run has no proof.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lqp_core::{Framework, Hash32, LiquidityError, ScenarioId};
use lqp_crypto::{Ed25519PublicKey, Ed25519Signature, FixedMerkleTree};
use lqp_risk::{compute_metrics, Classified, MetricSet, ThresholdSet};

use crate::encoding::encode_leaves;
use crate::oracle::{verify_attestation, Attestation};

/// The public statement of a liquidity proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicOutput {
    pub root: Hash32,
    pub overall_compliant: bool,
    pub framework: Framework,
    pub thresholds: ThresholdSet,
    pub oracle_public_key: Ed25519PublicKey,
}

/// A circuit instance: public statement plus private witness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityCircuit {
    pub public: PublicOutput,

    // -- Witness (private inputs) --
    pub scenario_id: ScenarioId,
    pub classified: Classified,
    pub metrics: MetricSet,
    pub oracle_signature: Ed25519Signature,
}

/// A constraint the witness does not satisfy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    #[error("recomputed root {recomputed} does not match public root {public}")]
    RootMismatch { public: Hash32, recomputed: Hash32 },

    #[error("oracle signature does not verify over the public root")]
    BadAttestation,

    #[error("committed metrics differ from metrics recomputed under the public thresholds")]
    MetricsMismatch,

    #[error("public framework {public} does not match witness framework {witness}")]
    FrameworkMismatch { public: Framework, witness: Framework },

    #[error("public compliance flag {public} does not match witness flag {witness}")]
    OutputMismatch { public: bool, witness: bool },

    #[error("liquidity requirements are not met")]
    NotCompliant,

    #[error("witness cannot be encoded: {0}")]
    Encoding(LiquidityError),
}

/// Assemble a circuit from a completed pipeline run.
///
/// The public compliance flag is taken from `metrics`; a non-compliant
/// run yields a circuit whose constraints are unsatisfiable.
pub fn build_circuit(
    classified: Classified,
    metrics: MetricSet,
    thresholds: ThresholdSet,
    scenario_id: ScenarioId,
    root: Hash32,
    attestation: &Attestation,
) -> LiquidityCircuit {
    LiquidityCircuit {
        public: PublicOutput {
            root,
            overall_compliant: metrics.overall_compliant,
            framework: classified.framework(),
            thresholds,
            oracle_public_key: attestation.public_key.clone(),
        },
        scenario_id,
        classified,
        metrics,
        oracle_signature: attestation.signature.clone(),
    }
}

impl LiquidityCircuit {
    pub fn public_output(&self) -> &PublicOutput {
        &self.public
    }

    /// Evaluate every constraint, stopping at the first violation.
    pub fn check_constraints(&self) -> Result<(), ConstraintViolation> {
        let witness_framework = self.classified.framework();
        if self.public.framework != witness_framework
            || self.public.thresholds.framework != witness_framework
        {
            return Err(ConstraintViolation::FrameworkMismatch {
                public: self.public.framework,
                witness: witness_framework,
            });
        }

        let leaves = encode_leaves(&self.classified, &self.metrics, &self.scenario_id)
            .map_err(ConstraintViolation::Encoding)?;
        let recomputed = FixedMerkleTree::build(&leaves)
            .map_err(|e| {
                ConstraintViolation::Encoding(LiquidityError::EncodingOverflow {
                    field: format!("commitment tree ({e})"),
                    period: None,
                    value: leaves.len() as i128,
                })
            })?
            .root();
        if recomputed != self.public.root {
            return Err(ConstraintViolation::RootMismatch {
                public: self.public.root,
                recomputed,
            });
        }

        if !verify_attestation(
            &self.oracle_signature,
            &self.public.oracle_public_key,
            &self.public.root,
        ) {
            return Err(ConstraintViolation::BadAttestation);
        }

        let expected = compute_metrics(
            &self.classified,
            &self.public.thresholds,
            self.classified.periods_count(),
        )
        .map_err(ConstraintViolation::Encoding)?;
        if expected != self.metrics {
            return Err(ConstraintViolation::MetricsMismatch);
        }

        if self.public.overall_compliant != self.metrics.overall_compliant {
            return Err(ConstraintViolation::OutputMismatch {
                public: self.public.overall_compliant,
                witness: self.metrics.overall_compliant,
            });
        }
        if !self.metrics.overall_compliant {
            return Err(ConstraintViolation::NotCompliant);
        }
        Ok(())
    }
}
