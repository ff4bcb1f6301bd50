//! # lqp-core — Foundational Types for the Liquidity Proof Stack
//!
//! Every other crate in the workspace depends on `lqp-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Integer money.** `Amount` is `i128` minor units at scale 10^6. No
//!    float ever enters aggregation, ratios, or commitment encoding.
//!
//! 2. **`CanonicalBytes` newtype.** JSON-level digests (config fingerprint,
//!    mock proofs) flow through `CanonicalBytes::new()`, which rejects floats.
//!
//! 3. **Closed framework set.** `Framework` is a three-variant enum; unknown
//!    names fail with `UnsupportedFramework`.
//!
//! 4. **Deterministic time.** `Timestamp` is UTC with seconds precision, and
//!    `PeriodType::units_between` never reads the wall clock.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lqp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod canonical;
pub mod config;
pub mod digest;
pub mod error;
pub mod framework;
pub mod identity;
pub mod temporal;

pub use amount::{Amount, AmountParseError, AMOUNT_DECIMALS, AMOUNT_SCALE};
pub use canonical::CanonicalBytes;
pub use config::{ConfigDocument, HaircutPolicy, VerificationConfig};
pub use digest::{sha256_digest, Hash32};
pub use error::{CanonicalizationError, CryptoError, LiquidityError};
pub use framework::Framework;
pub use identity::{ContractId, ScenarioId, MAX_IDENTIFIER_LEN};
pub use temporal::{PeriodType, Timestamp};
