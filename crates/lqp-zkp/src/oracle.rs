//! # Oracle Binding
//!
//! An oracle attests to a commitment root by signing its 32 raw bytes and
//! nothing else. Signature verification and root recomputation are
//! therefore independent checks that compose inside the circuit.

use serde::{Deserialize, Serialize};

use lqp_core::Hash32;
use lqp_crypto::{verify_digest, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// A root-signing attester.
pub trait Oracle: Send + Sync {
    fn public_key(&self) -> Ed25519PublicKey;

    /// Sign exactly the commitment root.
    fn sign(&self, root: &Hash32) -> Ed25519Signature;
}

/// An oracle holding its Ed25519 key in process.
#[derive(Debug)]
pub struct LocalOracle {
    key: Ed25519KeyPair,
}

impl LocalOracle {
    pub fn generate() -> Self {
        Self {
            key: Ed25519KeyPair::generate(),
        }
    }

    /// Deterministic oracle for replays and tests.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            key: Ed25519KeyPair::from_seed(seed),
        }
    }
}

impl Oracle for LocalOracle {
    fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }

    fn sign(&self, root: &Hash32) -> Ed25519Signature {
        self.key.sign_digest(root)
    }
}

/// A signed root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub public_key: Ed25519PublicKey,
    pub signature: Ed25519Signature,
}

/// Have `oracle` sign `root`.
pub fn attest(oracle: &dyn Oracle, root: &Hash32) -> Attestation {
    let attestation = Attestation {
        public_key: oracle.public_key(),
        signature: oracle.sign(root),
    };
    tracing::debug!(root = %root, oracle = %attestation.public_key, "root attested");
    attestation
}

/// True iff `signature` is `public_key`'s signature over `root`.
pub fn verify_attestation(
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
    root: &Hash32,
) -> bool {
    verify_digest(root, signature, public_key).is_ok()
}
