//! # lqp-ledger — Event Normalization and Temporal Bucketing
//!
//! Converts a contract cash-flow feed into [`TemporalData`]: per-period,
//! per-contract inflow and outflow magnitudes plus net flows, with every
//! event traceable to its period and contract.
//!
//! ## Invariants
//!
//! - `net_flows[p] == sum(inflows[p]) - sum(outflows[p])` for every period.
//! - Inflow and outflow entries are non-negative magnitudes.
//! - Period assignment is a function of `timestamp - start_date` only.

pub mod event;
pub mod normalize;
pub mod temporal;

pub use event::{Event, RawContract, RawEvent, RawPayoff};
pub use normalize::{normalize, NormalizeOptions, MAX_PERIODS};
pub use temporal::{ContractMeta, DateRange, EventDetails, TemporalData};
