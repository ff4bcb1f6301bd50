//! # Basel III Classifier
//!
//! Buckets contracts by HQLA level using their supplied category tags and
//! reports **unweighted** level totals. Haircuts are a property of the
//! ratio, not of the classification: the LCR numerator applies the
//! configured [`HaircutPolicy`] when the metric is computed.
//!
//! ## Ratios
//!
//! ```text
//! LCR  (unweighted)       = trunc(100 * (L1 + L2A + L2B) / outflow)
//! LCR  (basel3_standard)  = trunc((100*L1 + 85*L2A + 50*L2B) / outflow)
//! NSFR                    = trunc(100 * ASF / RSF)
//!   ASF = 100*in(L1) + 85*in(L2A) + 50*in(L2B) + 50*in(NonHQLA)
//!   RSF =   5*out(L1) + 15*out(L2A) + 50*out(L2B) + 100*out(NonHQLA)
//! ```
//!
//! `outflow` is the period's total outflow across all levels.

use serde::{Deserialize, Serialize};

use lqp_core::{Framework, HaircutPolicy, LiquidityError};
use lqp_ledger::TemporalData;

use crate::category::RegulatoryCategory;
use crate::classified::ClassifiedData;
use crate::classifier::{ClassifyParams, RiskClassifier};
use crate::ratio::{checked_total, weighted_sum, Fraction};

/// Basel III liquid-asset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HqlaLevel {
    #[serde(rename = "L1")]
    Level1,
    #[serde(rename = "L2A")]
    Level2A,
    #[serde(rename = "L2B")]
    Level2B,
    #[serde(rename = "NonHQLA")]
    NonHqla,
}

impl RegulatoryCategory for HqlaLevel {
    const FRAMEWORK: Framework = Framework::Basel3;

    fn all() -> &'static [Self] {
        &[Self::Level1, Self::Level2A, Self::Level2B, Self::NonHqla]
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Level1 => "L1",
            Self::Level2A => "L2A",
            Self::Level2B => "L2B",
            Self::NonHqla => "NonHQLA",
        }
    }

    fn conservative_default() -> Self {
        Self::NonHqla
    }

    fn from_normalized_label(label: &str) -> Option<Self> {
        match label {
            "L1" | "LEVEL1" | "HQLAL1" => Some(Self::Level1),
            "L2A" | "LEVEL2A" | "HQLAL2A" => Some(Self::Level2A),
            "L2B" | "LEVEL2B" | "HQLAL2B" => Some(Self::Level2B),
            "NONHQLA" | "NONE" => Some(Self::NonHqla),
            _ => None,
        }
    }
}

/// Basel III (2013) LCR haircut weights, in percent.
pub const LCR_STANDARD_WEIGHTS: [(HqlaLevel, i128); 3] = [
    (HqlaLevel::Level1, 100),
    (HqlaLevel::Level2A, 85),
    (HqlaLevel::Level2B, 50),
];

/// Available-stable-funding factors applied to inflows, in taxonomy order.
pub const ASF_WEIGHTS: [i128; 4] = [100, 85, 50, 50];

/// Required-stable-funding factors applied to outflows, in taxonomy order.
pub const RSF_WEIGHTS: [i128; 4] = [5, 15, 50, 100];

/// Classifier for [`Framework::Basel3`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Basel3Classifier;

impl RiskClassifier for Basel3Classifier {
    type Category = HqlaLevel;

    fn classify(
        &self,
        temporal: &TemporalData,
        params: &ClassifyParams,
    ) -> Result<ClassifiedData<HqlaLevel>, LiquidityError> {
        ClassifiedData::from_temporal(temporal, params.haircut_policy)
    }
}

/// LCR inputs for period `p` under the data's haircut policy.
pub fn lcr_fraction(
    data: &ClassifiedData<HqlaLevel>,
    p: usize,
) -> Result<Fraction, LiquidityError> {
    let outflow = data.total_outflow(p)?.minor();
    let fraction = match data.haircut_policy {
        HaircutPolicy::Unweighted => checked_total(
            LCR_STANDARD_WEIGHTS
                .iter()
                .map(|(level, _)| data.inflow(p, *level).minor()),
        )
        .and_then(|hqla| Fraction::pct(hqla, outflow)),
        HaircutPolicy::Basel3Standard => weighted_sum(
            LCR_STANDARD_WEIGHTS
                .iter()
                .map(|(level, w)| (data.inflow(p, *level).minor(), *w)),
        )
        .map(|weighted| Fraction::weighted(weighted, outflow)),
    };
    fraction.ok_or_else(|| LiquidityError::overflow("lcr numerator", Some(p), i128::MAX))
}

/// NSFR inputs for period `p`.
pub fn nsfr_fraction(
    data: &ClassifiedData<HqlaLevel>,
    p: usize,
) -> Result<Fraction, LiquidityError> {
    let overflow = |field: &str| LiquidityError::overflow(field, Some(p), i128::MAX);
    let asf = weighted_sum(
        HqlaLevel::all()
            .iter()
            .zip(ASF_WEIGHTS)
            .map(|(level, w)| (data.inflow(p, *level).minor(), w)),
    )
    .ok_or_else(|| overflow("nsfr available funding"))?;
    let rsf = weighted_sum(
        HqlaLevel::all()
            .iter()
            .zip(RSF_WEIGHTS)
            .map(|(level, w)| (data.outflow(p, *level).minor(), w)),
    )
    .ok_or_else(|| overflow("nsfr required funding"))?;
    Fraction::pct(asf, rsf).ok_or_else(|| overflow("nsfr numerator"))
}
