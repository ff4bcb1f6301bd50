//! # `lqp audit`
//!
//! Re-checks a report written by `lqp verify` without the private data:
//! every opening witness must recompute the committed root, and the
//! attestation must be a valid oracle signature over that root.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lqp_crypto::Ed25519PublicKey;
use lqp_engine::VerificationOutput;
use lqp_zkp::{verify_attestation, verify_commitment};

use crate::input::load_document;

/// Arguments for the `audit` subcommand.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Report produced by `lqp verify`.
    #[arg(value_name = "FILE")]
    pub report: PathBuf,

    /// Require the attestation to come from this oracle (hex public key).
    #[arg(long, value_name = "HEX")]
    pub oracle_key: Option<String>,
}

/// Execute `lqp audit`. Returns 0 when every check passes, 2 otherwise.
pub fn run_audit(args: &AuditArgs) -> Result<u8> {
    let output: VerificationOutput = load_document(&args.report)?;
    let expected_key = args
        .oracle_key
        .as_deref()
        .map(Ed25519PublicKey::from_hex)
        .transpose()
        .context("invalid --oracle-key")?;

    let mut failures = Vec::new();
    if output.commitment.root != output.root {
        failures.push(format!(
            "report root {} differs from commitment root {}",
            output.root, output.commitment.root
        ));
    }
    if let Err(e) = verify_commitment(&output.commitment) {
        failures.push(format!("commitment: {e}"));
    }
    let attestation = &output.attestation;
    if !verify_attestation(&attestation.signature, &attestation.public_key, &output.root) {
        failures.push("attestation signature does not cover the root".to_string());
    }
    if let Some(key) = expected_key {
        if key != attestation.public_key {
            failures.push(format!(
                "attested by {}, expected {}",
                attestation.public_key, key
            ));
        }
    }

    if failures.is_empty() {
        println!(
            "OK {} root={} compliant={}",
            output.scenario_id, output.root, output.overall_compliant
        );
        return Ok(0);
    }
    for f in &failures {
        tracing::warn!(scenario = %output.scenario_id, "audit failure: {f}");
        println!("FAIL {f}");
    }
    Ok(2)
}
