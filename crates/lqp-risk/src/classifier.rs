//! # Classifier Dispatch
//!
//! One [`RiskClassifier`] per framework. [`classify`] selects the variant
//! for a [`Framework`] and wraps the result in the [`Classified`] union.

use std::fmt::Debug;

use lqp_core::{Framework, HaircutPolicy, LiquidityError};
use lqp_ledger::TemporalData;

use crate::advanced::AdvancedClassifier;
use crate::basel3::Basel3Classifier;
use crate::category::RegulatoryCategory;
use crate::classified::{Classified, ClassifiedData};
use crate::stablecoin::StableCoinClassifier;

/// Versioned classification parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyParams {
    /// Recorded on the classified data; applied by the metric calculator.
    pub haircut_policy: HaircutPolicy,
}

/// A framework-specific classifier.
pub trait RiskClassifier: Send + Sync + Debug {
    type Category: RegulatoryCategory;

    fn framework(&self) -> Framework {
        Self::Category::FRAMEWORK
    }

    fn classify(
        &self,
        temporal: &TemporalData,
        params: &ClassifyParams,
    ) -> Result<ClassifiedData<Self::Category>, LiquidityError>;
}

/// Reject a haircut policy on frameworks that have no HQLA weighting.
pub(crate) fn require_unweighted(
    framework: Framework,
    params: &ClassifyParams,
) -> Result<(), LiquidityError> {
    if params.haircut_policy != HaircutPolicy::Unweighted {
        return Err(LiquidityError::config(format!(
            "haircut policy {} does not apply to {framework}",
            params.haircut_policy.as_str()
        )));
    }
    Ok(())
}

/// Classify `temporal` under `framework`.
pub fn classify(
    framework: Framework,
    temporal: &TemporalData,
    params: &ClassifyParams,
) -> Result<Classified, LiquidityError> {
    let classified = match framework {
        Framework::Basel3 => Classified::Basel3(Basel3Classifier.classify(temporal, params)?),
        Framework::Advanced => {
            Classified::Advanced(AdvancedClassifier.classify(temporal, params)?)
        }
        Framework::StableCoin => {
            Classified::StableCoin(StableCoinClassifier.classify(temporal, params)?)
        }
    };
    tracing::debug!(
        framework = %framework,
        periods = classified.periods_count(),
        categories = classified.category_count(),
        "classified cash flows"
    );
    Ok(classified)
}

/// Classify under a framework given by name.
pub fn classify_named(
    framework: &str,
    temporal: &TemporalData,
    params: &ClassifyParams,
) -> Result<Classified, LiquidityError> {
    classify(framework.parse()?, temporal, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advanced::FundingStability;
    use crate::basel3::HqlaLevel;
    use lqp_core::Amount;
    use lqp_ledger::{normalize, NormalizeOptions, RawContract, RawEvent, RawPayoff};

    fn contract(id: &str, category: Option<&str>, flows: &[(&str, i64)]) -> RawContract {
        RawContract {
            id: id.into(),
            category: category.map(String::from),
            events: flows
                .iter()
                .map(|(t, p)| RawEvent {
                    event_type: "CF".into(),
                    time: (*t).into(),
                    payoff: RawPayoff::Integer(*p),
                    currency: None,
                })
                .collect(),
        }
    }

    fn temporal() -> TemporalData {
        normalize(
            &[
                contract("BOND", Some("L1"), &[("2025-01-05", 1000), ("2025-02-05", 400)]),
                contract("CORP", Some("L2A"), &[("2025-01-10", 200)]),
                contract("DEP", None, &[("2025-01-20", -500), ("2025-02-20", -300)]),
            ],
            &NormalizeOptions {
                start_date: lqp_core::Timestamp::parse("2025-01-01").ok(),
                ..NormalizeOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn basel3_buckets_by_label_with_conservative_default() {
        let Classified::Basel3(data) =
            classify(Framework::Basel3, &temporal(), &ClassifyParams::default()).unwrap()
        else {
            panic!("expected Basel3 data");
        };
        assert_eq!(data.inflow(0, HqlaLevel::Level1), Amount::from_units(1000).unwrap());
        assert_eq!(data.inflow(0, HqlaLevel::Level2A), Amount::from_units(200).unwrap());
        assert_eq!(data.outflow(0, HqlaLevel::NonHqla), Amount::from_units(500).unwrap());
        assert_eq!(data.contract_categories[2], HqlaLevel::NonHqla);
        data.check_conservation().unwrap();
    }

    #[test]
    fn advanced_rejects_unknown_basel_label() {
        let err = classify(Framework::Advanced, &temporal(), &ClassifyParams::default());
        assert!(matches!(err, Err(LiquidityError::InvalidInput { .. })));
    }

    #[test]
    fn advanced_rejects_haircut_policy() {
        let t = normalize(
            &[contract("A", Some("stable"), &[("2025-01-01", 5)])],
            &NormalizeOptions::default(),
        )
        .unwrap();
        let params = ClassifyParams {
            haircut_policy: HaircutPolicy::Basel3Standard,
        };
        assert!(matches!(
            classify(Framework::Advanced, &t, &params),
            Err(LiquidityError::ConfigMismatch { .. })
        ));
        let ok = classify(Framework::Advanced, &t, &ClassifyParams::default()).unwrap();
        let Classified::Advanced(data) = ok else { panic!("expected Advanced data") };
        assert_eq!(data.contract_categories, vec![FundingStability::Stable]);
    }

    #[test]
    fn unknown_framework_name_is_unsupported() {
        assert!(matches!(
            classify_named("mifid", &temporal(), &ClassifyParams::default()),
            Err(LiquidityError::UnsupportedFramework(_))
        ));
    }
}
