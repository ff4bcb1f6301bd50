//! # Commitment Builder
//!
//! `commit(classified, metrics, scenario)` encodes the leaves (see
//! [`crate::encoding`]), builds the fixed-depth tree and materializes an
//! opening witness for every occupied slot.
//!
//! ## Invariants
//!
//! - For every leaf index `i`, `recompute_root(witness[i], leaf[i]) == root`.
//! - `commit` is a pure function: identical inputs give an identical root.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lqp_core::error::CryptoError;
use lqp_core::{Hash32, LiquidityError, ScenarioId};
use lqp_crypto::{FixedMerkleTree, OpeningWitness};
use lqp_risk::{Classified, MetricSet};

use crate::encoding::encode_leaves;

/// Leaves, root and per-leaf opening witnesses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub leaves: Vec<Hash32>,
    pub root: Hash32,
    pub witnesses: BTreeMap<usize, OpeningWitness>,
}

impl Commitment {
    /// Leaf hash and witness for slot `i`.
    pub fn opening(&self, i: usize) -> Option<(&Hash32, &OpeningWitness)> {
        Some((self.leaves.get(i)?, self.witnesses.get(&i)?))
    }
}

/// Build the commitment for one verification run.
pub fn commit(
    classified: &Classified,
    metrics: &MetricSet,
    scenario: &ScenarioId,
) -> Result<Commitment, LiquidityError> {
    let leaves = encode_leaves(classified, metrics, scenario)?;
    let tree = FixedMerkleTree::build(&leaves).map_err(|e| tree_error(leaves.len(), e))?;
    let witnesses = (0..tree.leaf_count())
        .map(|i| tree.witness(i).map(|w| (i, w)))
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map_err(|e| tree_error(leaves.len(), e))?;
    let commitment = Commitment {
        leaves,
        root: tree.root(),
        witnesses,
    };
    tracing::debug!(
        scenario = %scenario,
        leaves = commitment.leaves.len(),
        root = %commitment.root,
        "commitment built"
    );
    Ok(commitment)
}

fn tree_error(leaf_count: usize, e: CryptoError) -> LiquidityError {
    LiquidityError::EncodingOverflow {
        field: format!("commitment tree ({e})"),
        period: None,
        value: leaf_count as i128,
    }
}

/// Recompute the root from a single leaf and its witness.
pub fn recompute_root(witness: &OpeningWitness, leaf: &Hash32) -> Result<Hash32, CryptoError> {
    witness.recompute_root(leaf)
}

/// Check that every leaf opens to the root.
///
/// # Errors
///
/// `CryptoError::Merkle` naming the first slot whose witness is missing,
/// misindexed, or recomputes a different root.
pub fn verify_commitment(commitment: &Commitment) -> Result<(), CryptoError> {
    if commitment.witnesses.len() != commitment.leaves.len() {
        return Err(CryptoError::Merkle(format!(
            "{} witnesses for {} leaves",
            commitment.witnesses.len(),
            commitment.leaves.len()
        )));
    }
    for (i, leaf) in commitment.leaves.iter().enumerate() {
        let witness = commitment
            .witnesses
            .get(&i)
            .ok_or_else(|| CryptoError::Merkle(format!("no witness for leaf {i}")))?;
        if witness.leaf_index != i {
            return Err(CryptoError::Merkle(format!(
                "witness for slot {i} opens index {}",
                witness.leaf_index
            )));
        }
        let root = recompute_root(witness, leaf)?;
        if root != commitment.root {
            return Err(CryptoError::Merkle(format!("leaf {i} recomputes {root}")));
        }
    }
    Ok(())
}
