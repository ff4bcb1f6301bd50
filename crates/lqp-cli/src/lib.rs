//! # lqp-cli — Liquidity Proof CLI
//!
//! Subcommand handlers for the `lqp` binary. Each handler returns the
//! process exit code so `main` stays a thin dispatcher:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success / compliant |
//! | 1 | error (reported through `tracing::error!`) |
//! | 2 | ran cleanly but the result is non-compliant or fails audit |

pub mod audit;
pub mod input;
pub mod verify;
