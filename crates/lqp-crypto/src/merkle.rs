//! # Fixed-Depth Merkle Tree
//!
//! The commitment tree over pipeline leaves. Depth is a compile-time
//! constant ([`TREE_DEPTH`]), so an opening witness always has exactly
//! `TREE_DEPTH` steps and an in-circuit verifier has a fixed cost regardless
//! of how much data was committed.
//!
//! ## Algorithm
//!
//! Domain-separated SHA-256:
//! - Leaf: `SHA256(0x00 || payload)`.
//! - Node: `SHA256(0x01 || left || right)`.
//! - Unused slots hold `0^32` and are hashed like any other node.
//!
//! ## Security Invariant
//!
//! Leaf and node hashes use distinct prefixes, so a leaf can never be
//! reinterpreted as an internal node. Supplying more leaves than
//! [`TREE_CAPACITY`] is an error; nothing is dropped.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use lqp_core::error::CryptoError;
use lqp_core::Hash32;

/// Tree depth (number of levels above the leaves).
pub const TREE_DEPTH: usize = 5;

/// Number of leaf slots.
pub const TREE_CAPACITY: usize = 1 << TREE_DEPTH;

/// Domain tag for leaves.
pub const TAG_LEAF: u8 = 0x00;

/// Domain tag for internal nodes.
pub const TAG_NODE: u8 = 0x01;

/// `SHA256(0x00 || payload)`.
pub fn leaf_hash(payload: &[u8]) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update([TAG_LEAF]);
    hasher.update(payload);
    Hash32(hasher.finalize().into())
}

/// `SHA256(0x01 || left || right)`.
pub fn node_hash(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update([TAG_NODE]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Hash32(hasher.finalize().into())
}

/// Which side of the running hash a sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// One level of an opening witness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub side: Side,
    pub hash: Hash32,
}

/// Sibling path from one leaf slot to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningWitness {
    /// Slot index of the leaf this witness opens.
    pub leaf_index: usize,
    /// Exactly [`TREE_DEPTH`] steps, leaf level first.
    pub path: Vec<PathStep>,
}

impl OpeningWitness {
    /// Recompute the root from `leaf` by walking the sibling path.
    ///
    /// Returns an error if the path is not exactly `TREE_DEPTH` long or if
    /// a step's side disagrees with the bit of `leaf_index` at that level.
    pub fn recompute_root(&self, leaf: &Hash32) -> Result<Hash32, CryptoError> {
        if self.path.len() != TREE_DEPTH {
            return Err(CryptoError::Merkle(format!(
                "witness has {} steps, expected {TREE_DEPTH}",
                self.path.len()
            )));
        }
        if self.leaf_index >= TREE_CAPACITY {
            return Err(CryptoError::Merkle(format!(
                "leaf index {} outside tree capacity {TREE_CAPACITY}",
                self.leaf_index
            )));
        }
        let mut cur = *leaf;
        for (level, step) in self.path.iter().enumerate() {
            let expected = if (self.leaf_index >> level) & 1 == 1 {
                Side::Left
            } else {
                Side::Right
            };
            if step.side != expected {
                return Err(CryptoError::Merkle(format!(
                    "witness step {level} side does not match leaf index {}",
                    self.leaf_index
                )));
            }
            cur = match step.side {
                Side::Left => node_hash(&step.hash, &cur),
                Side::Right => node_hash(&cur, &step.hash),
            };
        }
        Ok(cur)
    }

    /// True if this witness opens `leaf` under `root`.
    pub fn verify(&self, leaf: &Hash32, root: &Hash32) -> bool {
        matches!(self.recompute_root(leaf), Ok(r) if r == *root)
    }
}

/// A fully materialized depth-[`TREE_DEPTH`] tree.
///
/// `levels[0]` holds the `TREE_CAPACITY` leaf slots; `levels[TREE_DEPTH]`
/// holds the root alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedMerkleTree {
    levels: Vec<Vec<Hash32>>,
    leaf_count: usize,
}

impl FixedMerkleTree {
    /// Build a tree whose first `leaves.len()` slots hold the given leaf
    /// hashes and whose remaining slots are empty.
    pub fn build(leaves: &[Hash32]) -> Result<Self, CryptoError> {
        if leaves.len() > TREE_CAPACITY {
            return Err(CryptoError::Merkle(format!(
                "{} leaves exceed tree capacity {TREE_CAPACITY}",
                leaves.len()
            )));
        }
        let mut slots = vec![Hash32::ZERO; TREE_CAPACITY];
        slots[..leaves.len()].copy_from_slice(leaves);

        let mut levels = Vec::with_capacity(TREE_DEPTH + 1);
        levels.push(slots);
        for depth in 0..TREE_DEPTH {
            let next: Vec<Hash32> = levels[depth]
                .chunks(2)
                .map(|pair| node_hash(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }
        Ok(Self {
            levels,
            leaf_count: leaves.len(),
        })
    }

    /// The commitment root.
    pub fn root(&self) -> Hash32 {
        self.levels[TREE_DEPTH][0]
    }

    /// Number of occupied leaf slots.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The occupied leaf hashes, in slot order.
    pub fn leaves(&self) -> &[Hash32] {
        &self.levels[0][..self.leaf_count]
    }

    /// Opening witness for an occupied slot.
    pub fn witness(&self, leaf_index: usize) -> Result<OpeningWitness, CryptoError> {
        if leaf_index >= self.leaf_count {
            return Err(CryptoError::Merkle(format!(
                "leaf index {leaf_index} out of range (tree holds {} leaves)",
                self.leaf_count
            )));
        }
        let mut pos = leaf_index;
        let mut path = Vec::with_capacity(TREE_DEPTH);
        for level in &self.levels[..TREE_DEPTH] {
            let sibling = pos ^ 1;
            let side = if sibling < pos { Side::Left } else { Side::Right };
            path.push(PathStep {
                side,
                hash: level[sibling],
            });
            pos /= 2;
        }
        Ok(OpeningWitness { leaf_index, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<Hash32> {
        (0..n).map(|i| leaf_hash(&[i as u8])).collect()
    }

    #[test]
    fn leaf_and_node_are_domain_separated() {
        let a = leaf_hash(b"x");
        let b = leaf_hash(b"y");
        let mut concat = Vec::new();
        concat.extend_from_slice(a.as_bytes());
        concat.extend_from_slice(b.as_bytes());
        assert_ne!(node_hash(&a, &b), leaf_hash(&concat));
    }

    #[test]
    fn empty_tree_root_is_deterministic() {
        let t1 = FixedMerkleTree::build(&[]).unwrap();
        let t2 = FixedMerkleTree::build(&[]).unwrap();
        assert_eq!(t1.root(), t2.root());
        let mut expected = Hash32::ZERO;
        for _ in 0..TREE_DEPTH {
            expected = node_hash(&expected, &expected);
        }
        assert_eq!(t1.root(), expected);
    }

    #[test]
    fn every_witness_recomputes_root() {
        let ls = leaves(15);
        let tree = FixedMerkleTree::build(&ls).unwrap();
        for (i, leaf) in ls.iter().enumerate() {
            let w = tree.witness(i).unwrap();
            assert_eq!(w.path.len(), TREE_DEPTH);
            assert_eq!(w.recompute_root(leaf).unwrap(), tree.root());
            assert!(w.verify(leaf, &tree.root()));
        }
    }

    #[test]
    fn witness_rejects_wrong_leaf() {
        let ls = leaves(4);
        let tree = FixedMerkleTree::build(&ls).unwrap();
        let w = tree.witness(1).unwrap();
        assert!(!w.verify(&ls[2], &tree.root()));
    }

    #[test]
    fn witness_rejects_flipped_side() {
        let tree = FixedMerkleTree::build(&leaves(3)).unwrap();
        let mut w = tree.witness(2).unwrap();
        w.path[1].side = Side::Left;
        assert!(w.recompute_root(&tree.leaves()[2]).is_err());
    }

    #[test]
    fn capacity_enforced() {
        assert!(FixedMerkleTree::build(&leaves(TREE_CAPACITY)).is_ok());
        let over = vec![Hash32::ZERO; TREE_CAPACITY + 1];
        assert!(FixedMerkleTree::build(&over).is_err());
        let tree = FixedMerkleTree::build(&leaves(2)).unwrap();
        assert!(tree.witness(2).is_err());
    }

    #[test]
    fn single_leaf_change_changes_root() {
        let mut ls = leaves(9);
        let before = FixedMerkleTree::build(&ls).unwrap().root();
        ls[4] = leaf_hash(b"tampered");
        let after = FixedMerkleTree::build(&ls).unwrap().root();
        assert_ne!(before, after);
    }

    #[test]
    fn witness_serde_uses_hex_and_side_names() {
        let tree = FixedMerkleTree::build(&leaves(2)).unwrap();
        let w = tree.witness(0).unwrap();
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["path"][0]["side"], "right");
        assert_eq!(json["path"][0]["hash"].as_str().unwrap().len(), 64);
        let back: OpeningWitness = serde_json::from_value(json).unwrap();
        assert_eq!(back, w);
    }
}
