//! End-to-end verification runs through the public engine API.

use std::collections::BTreeMap;

use lqp_core::{
    Framework, HaircutPolicy, LiquidityError, ScenarioId, Timestamp, VerificationConfig,
};
use lqp_crypto::TREE_DEPTH;
use proptest::prelude::*;
use lqp_engine::{prove_and_settle, run, EngineError, VerificationRequest};
use lqp_ledger::RawContract;
use lqp_risk::MetricKind;
use lqp_state::{current_root, current_status, ComplianceStatus, InMemoryStateStore, StateError};
use lqp_zkp::{
    recompute_root, verify_commitment, ConstraintViolation, LocalOracle, MockProofSystem,
    MockProvingKey, MockVerifyingKey, ProofError,
};

fn contracts(json: &str) -> Vec<RawContract> {
    serde_json::from_str(json).unwrap()
}

fn config(framework: Framework, thresholds: &[(&str, i64)]) -> VerificationConfig {
    let map: BTreeMap<String, i64> = thresholds.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    let mut config = VerificationConfig::new(framework, map);
    config.start_date = Timestamp::parse("2025-01-01").ok();
    config
}

fn request(contracts: Vec<RawContract>, config: VerificationConfig) -> VerificationRequest {
    VerificationRequest {
        scenario_id: ScenarioId::new("acme-bank/2025-q1").unwrap(),
        contracts,
        config,
    }
}

fn oracle() -> LocalOracle {
    LocalOracle::from_seed(&[0x5A; 32])
}

fn advanced_contracts() -> Vec<RawContract> {
    contracts(
        r#"[
          {"id": "TERM-DEPOSITS", "category": "stable", "events": [
            {"type": "IP", "time": "2025-01-05T00:00:00Z", "payoff": 100, "currency": "USD"},
            {"type": "IP", "time": "2025-02-05T00:00:00Z", "payoff": 100, "currency": "USD"},
            {"type": "IP", "time": "2025-03-05T00:00:00Z", "payoff": "100.000000", "currency": "USD"}
          ]},
          {"id": "WHOLESALE", "category": "volatile", "events": [
            {"type": "PR", "time": "2025-01-20T00:00:00Z", "payoff": -50, "currency": "USD"},
            {"type": "PR", "time": "2025-02-20T00:00:00Z", "payoff": -60, "currency": "USD"},
            {"type": "PR", "time": "2025-03-20T00:00:00Z", "payoff": -200, "currency": "USD"}
          ]}
        ]"#,
    )
}

fn basel3_contracts(outflow: i64) -> Vec<RawContract> {
    contracts(&format!(
        r#"[
          {{"id": "UST-2030", "category": "L1", "events": [
            {{"type": "MD", "time": "2025-01-05", "payoff": 1000}}]}},
          {{"id": "AGENCY-MBS", "category": "Level 2A", "events": [
            {{"type": "MD", "time": "2025-01-10", "payoff": 200}}]}},
          {{"id": "CORP-AA", "category": "L2B", "events": [
            {{"type": "MD", "time": "2025-01-12", "payoff": 100}}]}},
          {{"id": "RETAIL-DEPOSITS", "events": [
            {{"type": "PR", "time": "2025-01-25", "payoff": -{outflow}}}]}}
        ]"#
    ))
}

#[test]
fn advanced_scenario_fails_in_third_period() {
    let run = run(
        &request(advanced_contracts(), config(Framework::Advanced, &[("cumulative_liquidity", 100)])),
        &oracle(),
    )
    .unwrap();
    let out = &run.output;
    assert_eq!(out.temporal.periods_count, 3);
    assert_eq!(out.metrics.kind, MetricKind::CumulativeLiquidity);
    // 100/50, 200/110, 300/310
    assert_eq!(out.metrics.metrics.period_metrics, vec![200, 181, 96]);
    assert_eq!(out.metrics.metrics.per_period_compliance, vec![true, true, false]);
    assert!(out.metrics.metrics.average_metric >= 100);
    assert!(!out.overall_compliant);
}

#[test]
fn non_compliant_run_cannot_be_settled() {
    let run = run(
        &request(advanced_contracts(), config(Framework::Advanced, &[("cumulative_liquidity", 100)])),
        &oracle(),
    )
    .unwrap();
    let store = InMemoryStateStore::new();
    let err = prove_and_settle(&run, &MockProofSystem, &MockProvingKey, &MockVerifyingKey, &store)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Proof(ProofError::Unsatisfied(ConstraintViolation::NotCompliant))
    ));
    assert!(store.is_empty());
}

#[test]
fn basel3_lcr_compliant_and_not() {
    let mut cfg = config(Framework::Basel3, &[("lcr", 100)]);
    cfg.haircut_policy = HaircutPolicy::Basel3Standard;

    let ok = run(&request(basel3_contracts(500), cfg.clone()), &oracle()).unwrap();
    // (100*1000 + 85*200 + 50*100) / 500
    assert_eq!(ok.output.metrics.metrics.period_metrics, vec![244]);
    assert!(ok.output.overall_compliant);

    let bad = run(&request(basel3_contracts(1300), cfg), &oracle()).unwrap();
    assert_eq!(bad.output.metrics.metrics.period_metrics, vec![93]);
    assert!(!bad.output.overall_compliant);
    assert_ne!(ok.output.root, bad.output.root);
}

#[test]
fn haircut_policy_changes_lcr_and_root() {
    let weighted = {
        let mut cfg = config(Framework::Basel3, &[("lcr", 100)]);
        cfg.haircut_policy = HaircutPolicy::Basel3Standard;
        run(&request(basel3_contracts(500), cfg), &oracle()).unwrap()
    };
    let unweighted = run(
        &request(basel3_contracts(500), config(Framework::Basel3, &[("lcr", 100)])),
        &oracle(),
    )
    .unwrap();
    assert_eq!(unweighted.output.metrics.metrics.period_metrics, vec![260]);
    assert_ne!(weighted.output.root, unweighted.output.root);
}

#[test]
fn compliant_run_settles() {
    let mut cfg = config(Framework::Basel3, &[("lcr", 100), ("nsfr", 100)]);
    cfg.haircut_policy = HaircutPolicy::Basel3Standard;
    let run = run(&request(basel3_contracts(500), cfg), &oracle()).unwrap();
    assert_eq!(run.output.secondary_metrics.len(), 1);
    assert!(run.output.overall_compliant);

    let store = InMemoryStateStore::new();
    let record =
        prove_and_settle(&run, &MockProofSystem, &MockProvingKey, &MockVerifyingKey, &store)
            .unwrap();
    assert_eq!(record.to_state, ComplianceStatus::Compliant);
    assert_eq!(current_status(&store).unwrap(), ComplianceStatus::Compliant);
    assert_eq!(current_root(&store).unwrap(), Some(run.output.root));

    let again =
        prove_and_settle(&run, &MockProofSystem, &MockProvingKey, &MockVerifyingKey, &store)
            .unwrap_err();
    assert!(matches!(
        again,
        EngineError::Settlement(StateError::InvalidTransition { .. })
    ));
}

#[test]
fn empty_contract_list_is_no_data() {
    let err = run(&request(vec![], config(Framework::Basel3, &[("lcr", 100)])), &oracle())
        .unwrap_err();
    assert!(matches!(err, EngineError::Pipeline(LiquidityError::NoData { .. })));
    assert_eq!(err.kind(), "no_data");
}

#[test]
fn unknown_framework_fails_fast() {
    let err = VerificationConfig::from_yaml_str(
        "framework: mifid\nperiod_type: month\nthresholds: {lcr: 100}\n",
    )
    .unwrap_err();
    assert!(matches!(err, LiquidityError::UnsupportedFramework(_)));
}

#[test]
fn yaml_config_drives_a_run() {
    let cfg = VerificationConfig::from_yaml_str(
        r#"
framework: basel3
period_type: month
start_date: 2025-01-01
base_currency: usd
thresholds:
  lcr: 100
haircut_policy: basel3_standard
"#,
    )
    .unwrap();
    let run = run(&request(basel3_contracts(500), cfg), &oracle()).unwrap();
    assert_eq!(run.output.metrics.metrics.period_metrics, vec![244]);
}

#[test]
fn identical_inputs_give_identical_roots() {
    let cfg = config(Framework::Advanced, &[("cumulative_liquidity", 100)]);
    let a = run(&request(advanced_contracts(), cfg.clone()), &oracle()).unwrap();
    let b = run(&request(advanced_contracts(), cfg), &oracle()).unwrap();
    assert_ne!(a.output.run_id, b.output.run_id);
    assert_eq!(a.output.root, b.output.root);
    assert_eq!(a.output.commitment, b.output.commitment);
    assert_eq!(a.output.config_digest, b.output.config_digest);
}

#[test]
fn single_payoff_change_moves_root() {
    let cfg = config(Framework::Advanced, &[("cumulative_liquidity", 100)]);
    let base = run(&request(advanced_contracts(), cfg.clone()), &oracle()).unwrap();
    let mut changed = advanced_contracts();
    changed[1].events[0].payoff = lqp_ledger::RawPayoff::Decimal("-50.000001".into());
    let other = run(&request(changed, cfg), &oracle()).unwrap();
    assert_ne!(base.output.root, other.output.root);
}

#[test]
fn every_leaf_opens_to_the_root() {
    let run = run(
        &request(advanced_contracts(), config(Framework::Advanced, &[("cumulative_liquidity", 100)])),
        &oracle(),
    )
    .unwrap();
    let c = &run.output.commitment;
    // 3 funding buckets: scenario + 3 inflow + 3 outflow + net + bundle.
    assert_eq!(c.leaves.len(), 9);
    for (i, leaf) in c.leaves.iter().enumerate() {
        let w = &c.witnesses[&i];
        assert_eq!(w.path.len(), TREE_DEPTH);
        assert_eq!(recompute_root(w, leaf).unwrap(), c.root);
    }
    verify_commitment(c).unwrap();
}

#[test]
fn stablecoin_secondary_metrics_gate_compliance() {
    let reserves = contracts(
        r#"[
          {"id": "CASH", "category": "cash", "events": [{"type": "CF", "time": "2025-01-02", "payoff": 900}]},
          {"id": "CP", "category": "commercial paper", "events": [{"type": "CF", "time": "2025-01-03", "payoff": 200}]},
          {"id": "TOKENS", "events": [{"type": "CF", "time": "2025-01-04", "payoff": -1000}]}
        ]"#,
    );
    let lenient = config(Framework::StableCoin, &[("backing", 100), ("concentration", 90)]);
    let out = run(&request(reserves.clone(), lenient), &oracle()).unwrap().output;
    assert_eq!(out.metrics.metrics.period_metrics, vec![110]);
    assert_eq!(out.secondary_metrics[0].metrics.period_metrics, vec![81]);
    assert!(out.overall_compliant);

    let strict = config(Framework::StableCoin, &[("backing", 100), ("concentration", 50)]);
    let out = run(&request(reserves, strict), &oracle()).unwrap().output;
    assert!(out.metrics.metrics.overall_compliant);
    assert!(!out.overall_compliant);
}

#[test]
fn unknown_category_names_the_contract() {
    let bad = contracts(
        r#"[{"id": "MYSTERY", "category": "L9", "events": [{"type": "CF", "time": "2025-01-02", "payoff": 5}]}]"#,
    );
    let err = run(&request(bad, config(Framework::Basel3, &[("lcr", 100)])), &oracle()).unwrap_err();
    match err {
        EngineError::Pipeline(LiquidityError::InvalidInput { contract_id, .. }) => {
            assert_eq!(contract_id, "MYSTERY")
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn output_serializes_to_json() {
    let run = run(
        &request(advanced_contracts(), config(Framework::Advanced, &[("cumulative_liquidity", 100)])),
        &oracle(),
    )
    .unwrap();
    let json = serde_json::to_value(&run.output).unwrap();
    assert_eq!(json["root"].as_str(), Some(run.output.root.to_hex().as_str()));
    assert_eq!(json["overall_compliant"], serde_json::json!(false));
    assert_eq!(json["framework"], serde_json::json!("advanced"));
    assert_eq!(json["temporal"]["periods_count"], serde_json::json!(3));
    assert_eq!(json["attestation"]["public_key"].as_str().map(str::len), Some(64));
}

#[test]
fn payoff_beyond_word_range_is_encoding_overflow() {
    // 2e13 units is 2e19 minor units, above u64::MAX.
    let feed = contracts(
        r#"[
          {"id": "JUMBO", "category": "L1", "events": [
            {"type": "MD", "time": "2025-01-05", "payoff": "20000000000000"}]},
          {"id": "DEPOSITS", "events": [
            {"type": "PR", "time": "2025-01-20", "payoff": -500}]}
        ]"#,
    );
    let err = run(&request(feed, config(Framework::Basel3, &[("lcr", 100)])), &oracle()).unwrap_err();
    assert_eq!(err.kind(), "encoding_overflow");
    assert!(matches!(
        err,
        EngineError::Pipeline(LiquidityError::EncodingOverflow { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn verdict_tracks_unweighted_lcr(outflow in 1i64..5_000) {
        let cfg = config(Framework::Basel3, &[("lcr", 100)]);
        let run = run(&request(basel3_contracts(outflow), cfg), &oracle()).unwrap();
        let expected = 130_000 / i128::from(outflow);
        prop_assert_eq!(&run.output.metrics.metrics.period_metrics, &vec![expected]);
        prop_assert_eq!(run.output.overall_compliant, expected >= 100);

        let store = InMemoryStateStore::new();
        let settled = prove_and_settle(
            &run,
            &MockProofSystem,
            &MockProvingKey,
            &MockVerifyingKey,
            &store,
        );
        prop_assert_eq!(settled.is_ok(), run.output.overall_compliant);
    }
}
