//! # Stablecoin Reserve Classifier
//!
//! Contracts are reserve positions (positive payoffs add reserves) and
//! token liabilities (negative payoffs). Reserves are bucketed by asset
//! class for the concentration and quality checks.
//!
//! ```text
//! backing[p]            = trunc(100 * reserves[p] / liabilities[p])
//! concentration[p]      = trunc(100 * max_category(reserves[p]) / reserves[p])    0 if no reserves
//! high_quality_share[p] = trunc(100 * (cash + t_bills + reverse_repo) / reserves[p])
//! ```

use serde::{Deserialize, Serialize};

use lqp_core::{Framework, LiquidityError};
use lqp_ledger::TemporalData;

use crate::category::RegulatoryCategory;
use crate::classified::ClassifiedData;
use crate::classifier::{require_unweighted, ClassifyParams, RiskClassifier};
use crate::ratio::{checked_total, Fraction};

/// Reserve asset classes, most to least liquid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReserveAsset {
    Cash,
    TreasuryBills,
    ReverseRepo,
    MoneyMarketFund,
    CommercialPaper,
    Other,
}

impl ReserveAsset {
    /// Classes that count toward the high-quality share.
    pub const HIGH_QUALITY: [ReserveAsset; 3] =
        [Self::Cash, Self::TreasuryBills, Self::ReverseRepo];
}

impl RegulatoryCategory for ReserveAsset {
    const FRAMEWORK: Framework = Framework::StableCoin;

    fn all() -> &'static [Self] {
        &[
            Self::Cash,
            Self::TreasuryBills,
            Self::ReverseRepo,
            Self::MoneyMarketFund,
            Self::CommercialPaper,
            Self::Other,
        ]
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::TreasuryBills => "treasury_bills",
            Self::ReverseRepo => "reverse_repo",
            Self::MoneyMarketFund => "money_market_fund",
            Self::CommercialPaper => "commercial_paper",
            Self::Other => "other",
        }
    }

    fn conservative_default() -> Self {
        Self::Other
    }

    fn from_normalized_label(label: &str) -> Option<Self> {
        match label {
            "CASH" | "DEPOSITS" => Some(Self::Cash),
            "TREASURYBILLS" | "TBILLS" => Some(Self::TreasuryBills),
            "REVERSEREPO" => Some(Self::ReverseRepo),
            "MONEYMARKETFUND" | "MMF" => Some(Self::MoneyMarketFund),
            "COMMERCIALPAPER" => Some(Self::CommercialPaper),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Classifier for [`Framework::StableCoin`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StableCoinClassifier;

impl RiskClassifier for StableCoinClassifier {
    type Category = ReserveAsset;

    fn classify(
        &self,
        temporal: &TemporalData,
        params: &ClassifyParams,
    ) -> Result<ClassifiedData<ReserveAsset>, LiquidityError> {
        require_unweighted(Framework::StableCoin, params)?;
        ClassifiedData::from_temporal(temporal, params.haircut_policy)
    }
}

fn pct(field: &str, p: usize, num: i128, den: i128) -> Result<Fraction, LiquidityError> {
    Fraction::pct(num, den).ok_or_else(|| LiquidityError::overflow(field, Some(p), num))
}

pub fn backing_fraction(
    data: &ClassifiedData<ReserveAsset>,
    p: usize,
) -> Result<Fraction, LiquidityError> {
    let reserves = data.total_inflow(p)?.minor();
    pct("backing numerator", p, reserves, data.total_outflow(p)?.minor())
}

pub fn concentration_fraction(
    data: &ClassifiedData<ReserveAsset>,
    p: usize,
) -> Result<Fraction, LiquidityError> {
    let largest = ReserveAsset::all()
        .iter()
        .map(|a| data.inflow(p, *a).minor())
        .max()
        .unwrap_or(0);
    pct("concentration numerator", p, largest, data.total_inflow(p)?.minor())
}

pub fn high_quality_fraction(
    data: &ClassifiedData<ReserveAsset>,
    p: usize,
) -> Result<Fraction, LiquidityError> {
    let hq = checked_total(
        ReserveAsset::HIGH_QUALITY
            .iter()
            .map(|a| data.inflow(p, *a).minor()),
    )
    .ok_or_else(|| LiquidityError::overflow("high_quality_share numerator", Some(p), i128::MAX))?;
    pct("high_quality_share numerator", p, hq, data.total_inflow(p)?.minor())
}
