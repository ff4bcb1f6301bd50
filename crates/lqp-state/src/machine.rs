//! # Compliance State Machine
//!
//! ## States
//!
//! ```text
//! Unverified(100) ──settle──▶ Compliant(90)
//! ```
//!
//! `settle` is the only transition. It fires only when the proof verifies
//! against its public statement and that statement asserts
//! `overall_compliant`. There is no transition for a failed proof: a
//! failing run never reaches the store.
//!
//! ## Store Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | [`STATUS_KEY`] | [`ComplianceStatus`]; absent reads as `Unverified` |
//! | [`ROOT_KEY`] | latest settled commitment root |
//!
//! `settle` writes the status before the root and restores the status
//! when the root write loses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lqp_core::Hash32;
use lqp_zkp::{ProofSystem, PublicOutput, VerifyError};

use crate::status::ComplianceStatus;
use crate::store::{StateStore, StateValue};

pub const STATUS_KEY: &str = "compliance_status";
pub const ROOT_KEY: &str = "commitment_root";

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors that can occur during settlement.
#[derive(Error, Debug)]
pub enum StateError {
    /// The store is not in a state the transition starts from.
    #[error("invalid compliance transition: {from} -> {to}")]
    InvalidTransition {
        from: ComplianceStatus,
        to: ComplianceStatus,
    },

    /// The public statement does not assert compliance.
    #[error("public output is not compliant")]
    NotCompliant,

    /// The proof did not verify.
    #[error("proof rejected for root {root}")]
    ProofRejected { root: Hash32 },

    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// A stored value is of the wrong kind.
    #[error("corrupt state at {key}: {found:?}")]
    Corrupt { key: &'static str, found: StateValue },

    /// Another writer changed `key` between read and write.
    #[error("concurrent update of {key}")]
    Conflict { key: &'static str },
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a settled transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub from_state: ComplianceStatus,
    pub to_state: ComplianceStatus,
    pub root: Hash32,
    pub previous_root: Option<Hash32>,
}

// ─── Operations ──────────────────────────────────────────────────────

/// Current status; an absent key is `Unverified`.
pub fn current_status(store: &dyn StateStore) -> Result<ComplianceStatus, StateError> {
    match store.get(STATUS_KEY) {
        None => Ok(ComplianceStatus::Unverified),
        Some(StateValue::Status(s)) => Ok(s),
        Some(found) => Err(StateError::Corrupt {
            key: STATUS_KEY,
            found,
        }),
    }
}

/// Latest settled root, if any.
pub fn current_root(store: &dyn StateStore) -> Result<Option<Hash32>, StateError> {
    match store.get(ROOT_KEY) {
        None => Ok(None),
        Some(StateValue::Root(r)) => Ok(Some(r)),
        Some(found) => Err(StateError::Corrupt {
            key: ROOT_KEY,
            found,
        }),
    }
}

/// Verify `proof` and move the store from `Unverified` to `Compliant`,
/// recording `public_output.root`.
///
/// Status and root are read once, before verification. The status CAS
/// claims the transition; if the root CAS then loses, the status is put
/// back so the store never pairs a new status with a stale root.
pub fn settle<P: ProofSystem>(
    store: &dyn StateStore,
    proof_system: &P,
    vk: &P::VerifyingKey,
    proof: &P::Proof,
    public_output: &PublicOutput,
) -> Result<SettlementRecord, StateError> {
    let status_value = store.get(STATUS_KEY);
    let from = current_status(store)?;
    let previous_root = current_root(store)?;
    if from != ComplianceStatus::Unverified {
        return Err(StateError::InvalidTransition {
            from,
            to: ComplianceStatus::Compliant,
        });
    }
    if !public_output.overall_compliant {
        return Err(StateError::NotCompliant);
    }
    if !proof_system.verify(vk, proof, public_output)? {
        tracing::warn!(root = %public_output.root, "proof rejected at settlement");
        return Err(StateError::ProofRejected {
            root: public_output.root,
        });
    }

    let compliant = StateValue::Status(ComplianceStatus::Compliant);
    if !store.compare_and_set(STATUS_KEY, status_value.as_ref(), compliant.clone()) {
        return Err(StateError::Conflict { key: STATUS_KEY });
    }
    let root_value = previous_root.map(StateValue::Root);
    let new_root = StateValue::Root(public_output.root);
    if !store.compare_and_set(ROOT_KEY, root_value.as_ref(), new_root) {
        let restored = StateValue::Status(ComplianceStatus::Unverified);
        if !store.compare_and_set(STATUS_KEY, Some(&compliant), restored) {
            tracing::error!(root = %public_output.root, "status rollback lost a race");
        }
        return Err(StateError::Conflict { key: ROOT_KEY });
    }

    let record = SettlementRecord {
        from_state: from,
        to_state: ComplianceStatus::Compliant,
        root: public_output.root,
        previous_root,
    };
    tracing::info!(
        root = %record.root,
        from = %record.from_state,
        to = %record.to_state,
        "compliance settled"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::store::InMemoryStateStore;
    use lqp_core::{Framework, HaircutPolicy, ScenarioId, Timestamp};
    use lqp_ledger::{normalize, NormalizeOptions, RawContract, RawEvent, RawPayoff};
    use lqp_risk::{classify, compute_metrics, ClassifyParams, ThresholdSet};
    use lqp_zkp::{
        attest, build_circuit, commit, LocalOracle, MockProof, MockProofSystem, MockProvingKey,
        MockVerifyingKey,
    };

    fn contract(id: &str, category: &str, time: &str, payoff: i64) -> RawContract {
        RawContract {
            id: id.into(),
            category: Some(category.into()),
            events: vec![RawEvent {
                event_type: "CF".into(),
                time: time.into(),
                payoff: RawPayoff::Integer(payoff),
                currency: None,
            }],
        }
    }

    /// A proved LCR run with the given outflow.
    fn proved(outflow: i64) -> (MockProof, PublicOutput) {
        let temporal = normalize(
            &[
                contract("BOND", "L1", "2025-01-05", 1000),
                contract("CORP", "L2A", "2025-01-10", 200),
                contract("DEP", "NonHQLA", "2025-01-20", -outflow),
            ],
            &NormalizeOptions {
                start_date: Timestamp::parse("2025-01-01").ok(),
                ..NormalizeOptions::default()
            },
        )
        .unwrap();
        let classified = classify(
            Framework::Basel3,
            &temporal,
            &ClassifyParams {
                haircut_policy: HaircutPolicy::Basel3Standard,
            },
        )
        .unwrap();
        let raw: BTreeMap<String, i64> = [("lcr".to_string(), 100)].into_iter().collect();
        let thresholds = ThresholdSet::new(Framework::Basel3, &raw, 0).unwrap();
        let metrics = compute_metrics(&classified, &thresholds, temporal.periods_count).unwrap();
        let scenario = ScenarioId::new("bank-a").unwrap();
        let root = commit(&classified, &metrics, &scenario).unwrap().root;
        let attestation = attest(&LocalOracle::from_seed(&[5u8; 32]), &root);
        let circuit = build_circuit(classified, metrics, thresholds, scenario, root, &attestation);
        let proof = MockProofSystem.prove(&MockProvingKey, &circuit).unwrap();
        (proof, circuit.public_output().clone())
    }

    #[test]
    fn settles_unverified_to_compliant() {
        let store = InMemoryStateStore::new();
        let (proof, public) = proved(500);
        let record = settle(&store, &MockProofSystem, &MockVerifyingKey, &proof, &public).unwrap();
        assert_eq!(record.from_state, ComplianceStatus::Unverified);
        assert_eq!(record.to_state, ComplianceStatus::Compliant);
        assert_eq!(record.previous_root, None);
        assert_eq!(current_status(&store).unwrap(), ComplianceStatus::Compliant);
        assert_eq!(current_root(&store).unwrap(), Some(public.root));
    }

    #[test]
    fn second_settlement_is_invalid() {
        let store = InMemoryStateStore::new();
        let (proof, public) = proved(500);
        settle(&store, &MockProofSystem, &MockVerifyingKey, &proof, &public).unwrap();
        let err = settle(&store, &MockProofSystem, &MockVerifyingKey, &proof, &public).unwrap_err();
        assert!(matches!(err, StateError::InvalidTransition { .. }));
    }

    #[test]
    fn mismatched_proof_leaves_store_untouched() {
        let store = InMemoryStateStore::new();
        let (proof, _) = proved(500);
        let (_, other_public) = proved(400);
        let err = settle(&store, &MockProofSystem, &MockVerifyingKey, &proof, &other_public)
            .unwrap_err();
        assert!(matches!(err, StateError::ProofRejected { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn non_compliant_statement_is_refused() {
        let store = InMemoryStateStore::new();
        let (proof, mut public) = proved(500);
        public.overall_compliant = false;
        let err = settle(&store, &MockProofSystem, &MockVerifyingKey, &proof, &public).unwrap_err();
        assert!(matches!(err, StateError::NotCompliant));
        assert_eq!(current_status(&store).unwrap(), ComplianceStatus::Unverified);
    }

    /// Delegates to an in-memory store but refuses every root write.
    struct RootWriteFails(InMemoryStateStore);

    impl StateStore for RootWriteFails {
        fn get(&self, key: &str) -> Option<StateValue> {
            self.0.get(key)
        }

        fn compare_and_set(
            &self,
            key: &str,
            expected: Option<&StateValue>,
            new: StateValue,
        ) -> bool {
            key != ROOT_KEY && self.0.compare_and_set(key, expected, new)
        }
    }

    #[test]
    fn lost_root_write_restores_status() {
        let store = RootWriteFails(InMemoryStateStore::new());
        let (proof, public) = proved(500);
        let err = settle(&store, &MockProofSystem, &MockVerifyingKey, &proof, &public).unwrap_err();
        assert!(matches!(err, StateError::Conflict { key: ROOT_KEY }));
        assert_eq!(current_status(&store).unwrap(), ComplianceStatus::Unverified);
        assert_eq!(current_root(&store).unwrap(), None);

        // The restored store settles normally once writes go through.
        let record = settle(&store.0, &MockProofSystem, &MockVerifyingKey, &proof, &public).unwrap();
        assert_eq!(record.from_state, ComplianceStatus::Unverified);
    }

    #[test]
    fn corrupt_status_is_reported() {
        let store = InMemoryStateStore::new();
        assert!(store.compare_and_set(STATUS_KEY, None, StateValue::Root(Hash32::ZERO)));
        assert!(matches!(current_status(&store), Err(StateError::Corrupt { .. })));
    }
}
