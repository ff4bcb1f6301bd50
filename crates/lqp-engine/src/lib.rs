//! # lqp-engine — Verification Orchestration
//!
//! Wires the stage crates into a single call: [`run`] takes raw contracts,
//! a [`lqp_core::VerificationConfig`] and an oracle, and returns the
//! commitment, metrics and attestation. [`prove_and_settle`] hands the
//! result to a proof backend and the compliance store.
//!
//! ## Observability
//!
//! Each run executes inside an `info_span!("verification")` with the
//! scenario id and a uuid `run_id`. The `metrics` facade records
//! `lqp_verifications_total{framework, compliant}` and
//! `lqp_verification_failures_total{framework, kind}`. No exporter is
//! installed here.

pub mod error;
pub mod pipeline;

pub use error::EngineError;
pub use pipeline::{
    prove_and_settle, run, TemporalSummary, VerificationOutput, VerificationRequest,
    VerificationRun,
};
