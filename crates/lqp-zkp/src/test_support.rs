//! Shared fixtures for the unit tests in this crate.

use std::collections::BTreeMap;

use lqp_core::{Framework, HaircutPolicy, ScenarioId, Timestamp};
use lqp_ledger::{normalize, NormalizeOptions, RawContract, RawEvent, RawPayoff};
use lqp_risk::{classify, compute_metrics, Classified, ClassifyParams, MetricSet, ThresholdSet};

pub(crate) fn contract(id: &str, category: &str, flows: &[(&str, i64)]) -> RawContract {
    RawContract {
        id: id.into(),
        category: Some(category.into()),
        events: flows
            .iter()
            .map(|(t, p)| RawEvent {
                event_type: "CF".into(),
                time: (*t).into(),
                payoff: RawPayoff::Integer(*p),
                currency: Some("USD".into()),
            })
            .collect(),
    }
}

pub(crate) fn thresholds(framework: Framework, entries: &[(&str, i64)]) -> ThresholdSet {
    let raw: BTreeMap<String, i64> = entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    ThresholdSet::new(framework, &raw, 0).unwrap()
}

fn run(
    framework: Framework,
    contracts: &[RawContract],
    policy: HaircutPolicy,
    t: &ThresholdSet,
) -> (Classified, MetricSet, ScenarioId) {
    let temporal = normalize(
        contracts,
        &NormalizeOptions {
            start_date: Timestamp::parse("2025-01-01").ok(),
            ..NormalizeOptions::default()
        },
    )
    .unwrap();
    let classified = classify(
        framework,
        &temporal,
        &ClassifyParams {
            haircut_policy: policy,
        },
    )
    .unwrap();
    let metrics = compute_metrics(&classified, t, temporal.periods_count).unwrap();
    (classified, metrics, ScenarioId::new("bank-a-2025q1").unwrap())
}

pub(crate) fn basel3_thresholds() -> ThresholdSet {
    thresholds(Framework::Basel3, &[("lcr", 100)])
}

/// One period, LCR 244 under the standard haircuts: compliant.
pub(crate) fn basel3_run() -> (Classified, MetricSet, ScenarioId) {
    run(
        Framework::Basel3,
        &[
            contract("BOND", "L1", &[("2025-01-05", 1000)]),
            contract("CORP", "L2A", &[("2025-01-10", 200)]),
            contract("COVERED", "L2B", &[("2025-01-12", 100)]),
            contract("DEP", "NonHQLA", &[("2025-01-20", -500)]),
        ],
        HaircutPolicy::Basel3Standard,
        &basel3_thresholds(),
    )
}

/// Three periods with cumulative ratios 200, 181, 96: not compliant.
pub(crate) fn advanced_run() -> (Classified, MetricSet, ScenarioId) {
    run(
        Framework::Advanced,
        &[
            contract(
                "FUNDING",
                "stable",
                &[("2025-01-05", 100), ("2025-02-05", 100), ("2025-03-05", 100)],
            ),
            contract(
                "WITHDRAWALS",
                "volatile",
                &[("2025-01-20", -50), ("2025-02-20", -60), ("2025-03-20", -200)],
            ),
        ],
        HaircutPolicy::Unweighted,
        &thresholds(Framework::Advanced, &[("cumulative_liquidity", 100)]),
    )
}
