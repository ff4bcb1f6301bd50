//! # lqp CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lqp_cli::audit::{run_audit, AuditArgs};
use lqp_cli::verify::{run_verify, VerifyArgs};

/// Liquidity compliance proofs over committed cash-flow data.
///
/// Buckets contract events into periods, classifies them under a
/// regulatory framework, computes the framework's ratios, commits the
/// result to a Merkle root and has an oracle sign it.
#[derive(Parser, Debug)]
#[command(name = "lqp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a verification and write the signed report.
    Verify(VerifyArgs),

    /// Re-check the commitment and attestation of a saved report.
    Audit(AuditArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json {
        builder.json().init();
    } else {
        builder.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "lqp starting");

    let result = match cli.command {
        Commands::Verify(args) => run_verify(&args),
        Commands::Audit(args) => run_audit(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
