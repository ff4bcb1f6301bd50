//! # lqp-crypto — Cryptographic Primitives
//!
//! Building blocks for liquidity commitments:
//!
//! - **Word encoding**: every committed scalar becomes a 32-byte sign +
//!   magnitude word.
//! - **Fold hash**: variable-length word arrays compress to one digest at a
//!   fixed arity of 8 words per SHA-256 call.
//! - **Fixed-depth Merkle tree** with domain-separated leaves and nodes, and
//!   opening witnesses of constant length.
//! - **Ed25519** keys for the root-signing oracle.
//!
//! ## Crate Policy
//!
//! - Depends only on `lqp-core` internally.
//! - Tests use real SHA-256 and real Ed25519; nothing is mocked.

pub mod ed25519;
pub mod fold;
pub mod merkle;
pub mod word;

pub use ed25519::{verify_digest, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use fold::{fold_bools, fold_scalars, fold_scalars_indexed, fold_words, FOLD_ARITY};
pub use merkle::{
    leaf_hash, node_hash, FixedMerkleTree, OpeningWitness, PathStep, Side, TREE_CAPACITY,
    TREE_DEPTH,
};
pub use word::{encode_bool, encode_hash, encode_scalar, encode_u64, Word, WORD_LEN, ZERO_WORD};
