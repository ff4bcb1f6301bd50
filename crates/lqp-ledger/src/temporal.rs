//! # Temporal Data
//!
//! The bucketed view of an event feed. Flows are held as dense
//! `[period][contract]` matrices of non-negative magnitudes; the sign of a
//! cash flow is carried by which matrix it lands in.

use serde::{Deserialize, Serialize};

use lqp_core::{Amount, ContractId, LiquidityError, PeriodType, Timestamp};

use crate::event::Event;

/// Inclusive bucketing range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// Per-event bookkeeping, index-aligned with `events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Events ordered by (timestamp, contract index, input position).
    pub events: Vec<Event>,
    pub event_to_period_index: Vec<usize>,
    pub event_to_contract_index: Vec<usize>,
    pub start_date: Timestamp,
}

/// Contract metadata carried alongside the flow matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMeta {
    pub id: ContractId,
    /// Category label as supplied; `None` resolves to the framework default.
    pub category: Option<String>,
}

/// Bucketed cash flows for one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalData {
    pub periods_count: usize,
    pub period_type: PeriodType,
    pub period_size: u32,
    pub date_range: DateRange,
    /// `inflows[p][c]`: total positive payoff of contract `c` in period `p`.
    pub inflows: Vec<Vec<Amount>>,
    /// `outflows[p][c]`: total magnitude of negative payoffs.
    pub outflows: Vec<Vec<Amount>>,
    /// `net_flows[p] = sum(inflows[p]) - sum(outflows[p])`.
    pub net_flows: Vec<Amount>,
    pub event_details: EventDetails,
    pub contracts: Vec<ContractMeta>,
}

impl TemporalData {
    /// Number of contracts (columns of the flow matrices).
    pub fn contracts_count(&self) -> usize {
        self.contracts.len()
    }

    /// Total inflow of period `p` across contracts.
    pub fn period_inflow(&self, p: usize) -> Result<Amount, LiquidityError> {
        row_total(&self.inflows, p, "inflows")
    }

    /// Total outflow of period `p` across contracts.
    pub fn period_outflow(&self, p: usize) -> Result<Amount, LiquidityError> {
        row_total(&self.outflows, p, "outflows")
    }

    /// Check the shape of the flow matrices and the net-flow law.
    pub fn check_invariants(&self) -> Result<(), LiquidityError> {
        let n = self.periods_count;
        if self.inflows.len() != n || self.outflows.len() != n || self.net_flows.len() != n {
            return Err(LiquidityError::config(format!(
                "flow arrays disagree with periods_count {n}"
            )));
        }
        for p in 0..n {
            if self.inflows[p].len() != self.contracts.len()
                || self.outflows[p].len() != self.contracts.len()
            {
                return Err(LiquidityError::InvariantViolation {
                    period: p,
                    reason: "flow row width differs from contract count".into(),
                });
            }
            if self.inflows[p]
                .iter()
                .chain(&self.outflows[p])
                .any(|a| a.is_negative())
            {
                return Err(LiquidityError::InvariantViolation {
                    period: p,
                    reason: "negative flow magnitude".into(),
                });
            }
            let expected = self
                .period_inflow(p)?
                .checked_sub(self.period_outflow(p)?);
            if expected != Some(self.net_flows[p]) {
                return Err(LiquidityError::InvariantViolation {
                    period: p,
                    reason: "net flow differs from inflow minus outflow".into(),
                });
            }
        }
        Ok(())
    }
}

fn row_total(matrix: &[Vec<Amount>], p: usize, field: &str) -> Result<Amount, LiquidityError> {
    let row = matrix.get(p).map(Vec::as_slice).unwrap_or_default();
    Amount::checked_sum(row).ok_or_else(|| LiquidityError::overflow(field, Some(p), i128::MAX))
}
