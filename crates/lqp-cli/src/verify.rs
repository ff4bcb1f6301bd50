//! # `lqp verify`
//!
//! Runs the full pipeline over a contract feed and a config file and
//! writes the [`VerificationOutput`] as pretty JSON. With `--prove`, a
//! compliant run is also proved with the mock backend and settled into an
//! in-memory compliance store; the settlement record is added under
//! `"settlement"`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use lqp_core::{Hash32, ScenarioId};
use lqp_engine::{prove_and_settle, run, VerificationOutput, VerificationRequest};
use lqp_state::{InMemoryStateStore, SettlementRecord};
use lqp_zkp::{LocalOracle, MockProofSystem, MockProvingKey, MockVerifyingKey};

use crate::input::{load_config, load_contracts};

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Contract feed (JSON array, or YAML with a .yaml/.yml extension).
    #[arg(long, value_name = "FILE")]
    pub contracts: PathBuf,

    /// Verification config (YAML or JSON, by extension).
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Scenario the commitment is bound to.
    #[arg(long)]
    pub scenario: String,

    /// 32-byte hex seed for the oracle key. A fresh key is generated when
    /// omitted.
    #[arg(long, value_name = "HEX")]
    pub oracle_seed: Option<String>,

    /// Write the report here instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Prove and settle a compliant run with the mock backend.
    #[arg(long)]
    pub prove: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    output: &'a VerificationOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    settlement: Option<SettlementRecord>,
}

/// Execute `lqp verify`. Returns 0 when compliant, 2 when not.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let contracts = load_contracts(&args.contracts)?;
    let config = load_config(&args.config)?;
    let scenario_id = ScenarioId::new(&args.scenario).context("invalid --scenario")?;
    let oracle = match &args.oracle_seed {
        Some(hex) => {
            let seed = Hash32::from_hex(hex).context("invalid --oracle-seed")?;
            LocalOracle::from_seed(&seed.0)
        }
        None => LocalOracle::generate(),
    };

    let request = VerificationRequest {
        scenario_id,
        contracts,
        config,
    };
    let verification = run(&request, &oracle)?;
    let compliant = verification.output.overall_compliant;

    let settlement = if args.prove && compliant {
        let store = InMemoryStateStore::new();
        let record = prove_and_settle(
            &verification,
            &MockProofSystem,
            &MockProvingKey,
            &MockVerifyingKey,
            &store,
        )?;
        Some(record)
    } else {
        if args.prove {
            tracing::warn!("run is not compliant; skipping proof");
        }
        None
    };

    let report = Report {
        output: &verification.output,
        settlement,
    };
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    match &args.output {
        Some(path) => std::fs::write(path, format!("{json}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write report")?;
        }
    }

    if compliant {
        Ok(0)
    } else {
        Ok(2)
    }
}
