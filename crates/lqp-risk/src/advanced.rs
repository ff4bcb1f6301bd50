//! # Advanced Stress-Test Classifier
//!
//! Buckets contracts by funding stability. The compliance ratio for period
//! `p` is **cumulative**:
//!
//! ```text
//! cumulative_liquidity[p] = trunc(100 * sum(in[0..=p]) / sum(out[0..=p]))
//! ```
//!
//! An early surplus can carry later periods, but a run of heavy outflows
//! still drags the ratio below threshold, and every period must pass.

use serde::{Deserialize, Serialize};

use lqp_core::{Framework, LiquidityError};
use lqp_ledger::TemporalData;

use crate::category::RegulatoryCategory;
use crate::classified::ClassifiedData;
use crate::classifier::{require_unweighted, ClassifyParams, RiskClassifier};
use crate::ratio::Fraction;

/// Funding stability buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingStability {
    Stable,
    LessStable,
    Volatile,
}

impl RegulatoryCategory for FundingStability {
    const FRAMEWORK: Framework = Framework::Advanced;

    fn all() -> &'static [Self] {
        &[Self::Stable, Self::LessStable, Self::Volatile]
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::LessStable => "less_stable",
            Self::Volatile => "volatile",
        }
    }

    fn conservative_default() -> Self {
        Self::Volatile
    }

    fn from_normalized_label(label: &str) -> Option<Self> {
        match label {
            "STABLE" => Some(Self::Stable),
            "LESSSTABLE" => Some(Self::LessStable),
            "VOLATILE" | "UNSTABLE" => Some(Self::Volatile),
            _ => None,
        }
    }
}

/// Classifier for [`Framework::Advanced`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvancedClassifier;

impl RiskClassifier for AdvancedClassifier {
    type Category = FundingStability;

    fn classify(
        &self,
        temporal: &TemporalData,
        params: &ClassifyParams,
    ) -> Result<ClassifiedData<FundingStability>, LiquidityError> {
        require_unweighted(Framework::Advanced, params)?;
        ClassifiedData::from_temporal(temporal, params.haircut_policy)
    }
}

/// Cumulative liquidity inputs for every period.
pub fn cumulative_liquidity_fractions(
    data: &ClassifiedData<FundingStability>,
) -> Result<Vec<Fraction>, LiquidityError> {
    data.cumulative_inflows()?
        .into_iter()
        .zip(data.cumulative_outflows()?)
        .enumerate()
        .map(|(p, (cum_in, cum_out))| {
            Fraction::pct(cum_in.minor(), cum_out.minor()).ok_or_else(|| {
                LiquidityError::overflow("cumulative_liquidity numerator", Some(p), cum_in.minor())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratio::RATIO_CEILING;
    use lqp_core::{Amount, HaircutPolicy};

    fn units(n: i64) -> Amount {
        Amount::from_units(n).unwrap()
    }

    fn three_periods() -> ClassifiedData<FundingStability> {
        let ins = [100, 100, 100];
        let outs = [50, 60, 200];
        ClassifiedData {
            haircut_policy: HaircutPolicy::Unweighted,
            periods_count: 3,
            inflows: ins.iter().map(|i| vec![units(*i), Amount::ZERO, Amount::ZERO]).collect(),
            outflows: outs.iter().map(|o| vec![Amount::ZERO, Amount::ZERO, units(*o)]).collect(),
            net_flows: ins.iter().zip(outs).map(|(i, o)| units(i - o)).collect(),
            contract_categories: vec![],
        }
    }

    #[test]
    fn ratios_are_cumulative_not_per_period() {
        let ratios: Vec<i128> = cumulative_liquidity_fractions(&three_periods())
            .unwrap()
            .iter()
            .map(|f| f.ratio(RATIO_CEILING))
            .collect();
        // 100/50, 200/110, 300/310
        assert_eq!(ratios, vec![200, 181, 96]);
    }

    #[test]
    fn labels() {
        assert_eq!(FundingStability::resolve(Some("Less Stable"), "c"), Ok(FundingStability::LessStable));
        assert_eq!(FundingStability::resolve(None, "c"), Ok(FundingStability::Volatile));
    }
}
