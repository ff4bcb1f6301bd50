//! # lqp-zkp — Commitment, Circuit, and Proof Boundary
//!
//! ## Architecture
//!
//! - **Encoding** (`encoding.rs`): the fixed leaf layout and metric bundle.
//!   Off-circuit commitment and in-circuit recomputation share this code.
//!
//! - **Commitment** (`commitment.rs`): `commit` builds the depth-5 tree and
//!   an opening witness per leaf; `verify_commitment` checks them all.
//!
//! - **Oracle** (`oracle.rs`): root attestation. The signed message is the
//!   32-byte root and nothing else.
//!
//! - **Circuit** (`circuit.rs`): [`LiquidityCircuit`] and its public
//!   statement [`PublicOutput`], with native constraint evaluation.
//!
//! - **Traits** (`traits.rs`) and **Mock** (`mock.rs`, feature `mock`):
//!   the `ProofSystem` boundary and a deterministic backend that proves
//!   only satisfied circuits.
//!
//! ## Crate Policy
//!
//! - Depends on `lqp-core`, `lqp-crypto` and `lqp-risk` internally.
//! - No randomness enters any committed value.

pub mod circuit;
pub mod commitment;
pub mod encoding;
#[cfg(feature = "mock")]
pub mod mock;
pub mod oracle;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use circuit::{build_circuit, ConstraintViolation, LiquidityCircuit, PublicOutput};
pub use commitment::{commit, recompute_root, verify_commitment, Commitment};
pub use encoding::{encode_leaves, leaf_payloads, LeafLayout};
#[cfg(feature = "mock")]
pub use mock::{MockProof, MockProofSystem, MockProvingKey, MockVerifyingKey};
pub use oracle::{attest, verify_attestation, Attestation, LocalOracle, Oracle};
pub use traits::{ProofError, ProofSystem, VerifyError};
