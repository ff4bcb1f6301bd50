//! # lqp-state — Compliance State Machine
//!
//! Settles verified liquidity proofs into a persisted status over a
//! compare-and-set key-value store.
//!
//! - [`ComplianceStatus`]: `Unverified(100)` and `Compliant(90)`.
//! - [`StateStore`]: `get` plus atomic `compare_and_set`;
//!   [`InMemoryStateStore`] is the process-local implementation.
//! - [`settle`]: the single `Unverified -> Compliant` transition.

pub mod machine;
pub mod status;
pub mod store;

pub use machine::{
    current_root, current_status, settle, SettlementRecord, StateError, ROOT_KEY, STATUS_KEY,
};
pub use status::ComplianceStatus;
pub use store::{InMemoryStateStore, StateStore, StateValue};
