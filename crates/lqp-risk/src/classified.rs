//! # Classified Data
//!
//! [`ClassifiedData<T>`] is bucketed flow data re-aggregated by regulatory
//! category instead of by contract. [`Classified`] is the closed union over
//! the three framework taxonomies that downstream stages (metrics,
//! commitment, circuit) dispatch on.
//!
//! ## Conservation Invariant
//!
//! For every period, `sum(inflows[p]) - sum(outflows[p]) == net_flows[p]`,
//! and `net_flows[p]` equals the temporal data's raw net flow. Nothing is
//! dropped or double-counted by classification.

use serde::{Deserialize, Serialize};

use lqp_core::{Amount, Framework, HaircutPolicy, LiquidityError};
use lqp_ledger::TemporalData;

use crate::advanced::FundingStability;
use crate::basel3::HqlaLevel;
use crate::category::RegulatoryCategory;
use crate::stablecoin::ReserveAsset;

/// Per-period category totals for a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: RegulatoryCategory")]
pub struct ClassifiedData<T: RegulatoryCategory> {
    pub haircut_policy: HaircutPolicy,
    pub periods_count: usize,
    /// `inflows[p][T::index()]`.
    pub inflows: Vec<Vec<Amount>>,
    /// `outflows[p][T::index()]`.
    pub outflows: Vec<Vec<Amount>>,
    pub net_flows: Vec<Amount>,
    /// Resolved category of each contract, index-aligned with the temporal
    /// data's contract list.
    pub contract_categories: Vec<T>,
}

impl<T: RegulatoryCategory> ClassifiedData<T> {
    /// Re-aggregate `temporal` by category.
    pub fn from_temporal(
        temporal: &TemporalData,
        haircut_policy: HaircutPolicy,
    ) -> Result<Self, LiquidityError> {
        temporal.check_invariants()?;
        let contract_categories = temporal
            .contracts
            .iter()
            .map(|c| T::resolve(c.category.as_deref(), c.id.as_str()))
            .collect::<Result<Vec<T>, _>>()?;

        let width = T::all().len();
        let mut inflows = vec![vec![Amount::ZERO; width]; temporal.periods_count];
        let mut outflows = vec![vec![Amount::ZERO; width]; temporal.periods_count];
        for p in 0..temporal.periods_count {
            for (c, category) in contract_categories.iter().enumerate() {
                let k = category.index();
                inflows[p][k] = add(inflows[p][k], temporal.inflows[p][c], "inflows", *category, p)?;
                outflows[p][k] =
                    add(outflows[p][k], temporal.outflows[p][c], "outflows", *category, p)?;
            }
        }

        let data = Self {
            haircut_policy,
            periods_count: temporal.periods_count,
            inflows,
            outflows,
            net_flows: temporal.net_flows.clone(),
            contract_categories,
        };
        data.check_conservation()?;
        Ok(data)
    }

    /// Inflow total of `category` in period `p`.
    pub fn inflow(&self, p: usize, category: T) -> Amount {
        cell(&self.inflows, p, category.index())
    }

    /// Outflow total of `category` in period `p`.
    pub fn outflow(&self, p: usize, category: T) -> Amount {
        cell(&self.outflows, p, category.index())
    }

    pub fn total_inflow(&self, p: usize) -> Result<Amount, LiquidityError> {
        row_total(&self.inflows, p, "inflows")
    }

    pub fn total_outflow(&self, p: usize) -> Result<Amount, LiquidityError> {
        row_total(&self.outflows, p, "outflows")
    }

    /// Running inflow totals over periods `0..=p`.
    pub fn cumulative_inflows(&self) -> Result<Vec<Amount>, LiquidityError> {
        let totals = (0..self.periods_count)
            .map(|p| self.total_inflow(p))
            .collect::<Result<Vec<_>, _>>()?;
        running(&totals, "cumulative_inflows")
    }

    /// Running outflow totals over periods `0..=p`.
    pub fn cumulative_outflows(&self) -> Result<Vec<Amount>, LiquidityError> {
        let totals = (0..self.periods_count)
            .map(|p| self.total_outflow(p))
            .collect::<Result<Vec<_>, _>>()?;
        running(&totals, "cumulative_outflows")
    }

    /// The inflow series of each category, in taxonomy order.
    pub fn inflow_series(&self) -> Vec<Vec<Amount>> {
        series(&self.inflows, T::all().len())
    }

    /// The outflow series of each category, in taxonomy order.
    pub fn outflow_series(&self) -> Vec<Vec<Amount>> {
        series(&self.outflows, T::all().len())
    }

    /// Check shapes and the conservation law.
    pub fn check_conservation(&self) -> Result<(), LiquidityError> {
        let width = T::all().len();
        if self.inflows.len() != self.periods_count
            || self.outflows.len() != self.periods_count
            || self.net_flows.len() != self.periods_count
        {
            return Err(LiquidityError::config(format!(
                "classified arrays disagree with periods_count {}",
                self.periods_count
            )));
        }
        for p in 0..self.periods_count {
            if self.inflows[p].len() != width || self.outflows[p].len() != width {
                return Err(LiquidityError::InvariantViolation {
                    period: p,
                    reason: format!("expected {width} category buckets"),
                });
            }
            if self.inflows[p].iter().chain(&self.outflows[p]).any(|a| a.is_negative()) {
                return Err(LiquidityError::InvariantViolation {
                    period: p,
                    reason: "negative category bucket".into(),
                });
            }
            let net = self.total_inflow(p)?.checked_sub(self.total_outflow(p)?);
            if net != Some(self.net_flows[p]) {
                return Err(LiquidityError::InvariantViolation {
                    period: p,
                    reason: "category buckets do not sum to the period net flow".into(),
                });
            }
        }
        Ok(())
    }
}

fn add<T: RegulatoryCategory>(
    acc: Amount,
    v: Amount,
    field: &str,
    category: T,
    period: usize,
) -> Result<Amount, LiquidityError> {
    acc.checked_add(v).ok_or_else(|| LiquidityError::EncodingOverflow {
        field: format!("{field}[{}]", category.as_str()),
        period: Some(period),
        value: v.minor(),
    })
}

fn cell(matrix: &[Vec<Amount>], p: usize, k: usize) -> Amount {
    matrix.get(p).and_then(|row| row.get(k)).copied().unwrap_or(Amount::ZERO)
}

fn row_total(matrix: &[Vec<Amount>], p: usize, field: &str) -> Result<Amount, LiquidityError> {
    let row = matrix.get(p).map(Vec::as_slice).unwrap_or_default();
    Amount::checked_sum(row).ok_or_else(|| LiquidityError::overflow(field, Some(p), i128::MAX))
}

fn running(values: &[Amount], field: &str) -> Result<Vec<Amount>, LiquidityError> {
    let mut acc = Amount::ZERO;
    values
        .iter()
        .enumerate()
        .map(|(p, v)| {
            acc = acc
                .checked_add(*v)
                .ok_or_else(|| LiquidityError::overflow(field, Some(p), v.minor()))?;
            Ok(acc)
        })
        .collect()
}

fn series(matrix: &[Vec<Amount>], width: usize) -> Vec<Vec<Amount>> {
    (0..width)
        .map(|k| matrix.iter().map(|row| row.get(k).copied().unwrap_or(Amount::ZERO)).collect())
        .collect()
}

/// Classified data for one of the supported frameworks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "framework", content = "data", rename_all = "snake_case")]
pub enum Classified {
    Basel3(ClassifiedData<HqlaLevel>),
    Advanced(ClassifiedData<FundingStability>),
    #[serde(rename = "stablecoin")]
    StableCoin(ClassifiedData<ReserveAsset>),
}

macro_rules! with_data {
    ($self:expr, $d:ident => $body:expr) => {
        match $self {
            Classified::Basel3($d) => $body,
            Classified::Advanced($d) => $body,
            Classified::StableCoin($d) => $body,
        }
    };
}

impl Classified {
    pub fn framework(&self) -> Framework {
        match self {
            Self::Basel3(_) => Framework::Basel3,
            Self::Advanced(_) => Framework::Advanced,
            Self::StableCoin(_) => Framework::StableCoin,
        }
    }

    pub fn periods_count(&self) -> usize {
        with_data!(self, d => d.periods_count)
    }

    pub fn haircut_policy(&self) -> HaircutPolicy {
        with_data!(self, d => d.haircut_policy)
    }

    /// Number of categories in the framework taxonomy.
    pub fn category_count(&self) -> usize {
        match self {
            Self::Basel3(_) => HqlaLevel::all().len(),
            Self::Advanced(_) => FundingStability::all().len(),
            Self::StableCoin(_) => ReserveAsset::all().len(),
        }
    }

    /// Category labels in taxonomy order.
    pub fn category_labels(&self) -> Vec<&'static str> {
        match self {
            Self::Basel3(_) => HqlaLevel::all().iter().map(|c| c.as_str()).collect(),
            Self::Advanced(_) => FundingStability::all().iter().map(|c| c.as_str()).collect(),
            Self::StableCoin(_) => ReserveAsset::all().iter().map(|c| c.as_str()).collect(),
        }
    }

    pub fn inflow_series(&self) -> Vec<Vec<Amount>> {
        with_data!(self, d => d.inflow_series())
    }

    pub fn outflow_series(&self) -> Vec<Vec<Amount>> {
        with_data!(self, d => d.outflow_series())
    }

    pub fn net_flows(&self) -> &[Amount] {
        with_data!(self, d => &d.net_flows)
    }

    pub fn check_conservation(&self) -> Result<(), LiquidityError> {
        with_data!(self, d => d.check_conservation())
    }
}
