//! # Verification Pipeline
//!
//! One call runs a verification request end to end:
//!
//! 1. **Thresholds** are validated against the framework catalogue.
//! 2. **Normalize**: raw contracts become [`TemporalData`].
//! 3. **Classify** under the configured framework and haircut policy.
//! 4. **Measure**: every configured metric, every period.
//! 5. **Commit**: leaves, root, witnesses; the witnesses are self-checked.
//! 6. **Attest**: the oracle signs the root.
//!
//! Proving and settlement are a separate step ([`prove_and_settle`]) so a
//! caller can inspect a non-compliant result without ever reaching the
//! proof backend.
//!
//! Every run gets a fresh `run_id` for log correlation. It never enters
//! hashed material, so two runs over the same input have the same root.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lqp_core::{
    Framework, HaircutPolicy, Hash32, LiquidityError, PeriodType, ScenarioId, VerificationConfig,
};
use lqp_ledger::{normalize, DateRange, NormalizeOptions, RawContract, TemporalData};
use lqp_risk::{
    classify, compute_metrics, Classified, ClassifyParams, MetricReport, MetricSet, ThresholdSet,
};
use lqp_state::{settle, SettlementRecord, StateStore};
use lqp_zkp::{
    attest, build_circuit, commit, verify_commitment, Attestation, Commitment, LiquidityCircuit,
    Oracle, ProofSystem,
};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Inputs of one verification run.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub scenario_id: ScenarioId,
    pub contracts: Vec<RawContract>,
    pub config: VerificationConfig,
}

/// Shape of the bucketed data, without the flows themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalSummary {
    pub periods_count: usize,
    pub period_type: PeriodType,
    pub period_size: u32,
    pub date_range: DateRange,
    pub contracts_count: usize,
    pub events_count: usize,
}

impl From<&TemporalData> for TemporalSummary {
    fn from(t: &TemporalData) -> Self {
        Self {
            periods_count: t.periods_count,
            period_type: t.period_type,
            period_size: t.period_size,
            date_range: t.date_range,
            contracts_count: t.contracts_count(),
            events_count: t.event_details.events.len(),
        }
    }
}

/// Result of a verification run, serializable as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutput {
    pub run_id: Uuid,
    pub scenario_id: ScenarioId,
    pub framework: Framework,
    pub haircut_policy: HaircutPolicy,
    pub root: Hash32,
    pub overall_compliant: bool,
    /// The framework's primary metric.
    pub metrics: MetricReport,
    pub secondary_metrics: Vec<MetricReport>,
    pub commitment: Commitment,
    pub temporal: TemporalSummary,
    /// `SHA256(JCS(config))`, for audit. Not part of the commitment.
    pub config_digest: Hash32,
    pub attestation: Attestation,
}

/// A completed run: the public output plus the private witness needed to
/// build the circuit.
#[derive(Debug, Clone)]
pub struct VerificationRun {
    pub output: VerificationOutput,
    pub classified: Classified,
    pub metric_set: MetricSet,
    pub thresholds: ThresholdSet,
}

impl VerificationRun {
    /// The liquidity circuit for this run.
    pub fn circuit(&self) -> LiquidityCircuit {
        build_circuit(
            self.classified.clone(),
            self.metric_set.clone(),
            self.thresholds.clone(),
            self.output.scenario_id.clone(),
            self.output.root,
            &self.output.attestation,
        )
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run normalize → classify → measure → commit → attest.
pub fn run(
    request: &VerificationRequest,
    oracle: &dyn Oracle,
) -> Result<VerificationRun, EngineError> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "verification",
        scenario = %request.scenario_id,
        run_id = %run_id
    );
    let _guard = span.enter();
    let framework = request.config.framework;

    let result = execute(request, oracle, run_id);
    match &result {
        Ok(run) => {
            let compliant = run.output.overall_compliant;
            metrics::counter!(
                "lqp_verifications_total",
                "framework" => framework.as_str(),
                "compliant" => if compliant { "true" } else { "false" }
            )
            .increment(1);
            tracing::info!(
                framework = %framework,
                root = %run.output.root,
                compliant,
                periods = run.output.temporal.periods_count,
                "verification complete"
            );
        }
        Err(e) => {
            metrics::counter!(
                "lqp_verification_failures_total",
                "framework" => framework.as_str(),
                "kind" => e.kind()
            )
            .increment(1);
            tracing::warn!(framework = %framework, error = %e, "verification failed");
        }
    }
    result
}

fn execute(
    request: &VerificationRequest,
    oracle: &dyn Oracle,
    run_id: Uuid,
) -> Result<VerificationRun, EngineError> {
    let config = &request.config;
    let thresholds = ThresholdSet::from_config(config)?;

    let temporal = normalize(&request.contracts, &NormalizeOptions::from_config(config))?;
    tracing::debug!(
        periods = temporal.periods_count,
        contracts = temporal.contracts_count(),
        "normalized"
    );

    let classified = classify(
        config.framework,
        &temporal,
        &ClassifyParams {
            haircut_policy: config.haircut_policy,
        },
    )?;
    let metric_set = compute_metrics(&classified, &thresholds, temporal.periods_count)?;

    let commitment = commit(&classified, &metric_set, &request.scenario_id)?;
    verify_commitment(&commitment)?;
    let attestation = attest(oracle, &commitment.root);

    let primary = metric_set
        .primary()
        .cloned()
        .ok_or_else(|| LiquidityError::config("no primary metric configured"))?;
    let output = VerificationOutput {
        run_id,
        scenario_id: request.scenario_id.clone(),
        framework: config.framework,
        haircut_policy: config.haircut_policy,
        root: commitment.root,
        overall_compliant: metric_set.overall_compliant,
        metrics: primary,
        secondary_metrics: metric_set.secondary().to_vec(),
        commitment,
        temporal: TemporalSummary::from(&temporal),
        config_digest: config.digest()?,
        attestation,
    };
    Ok(VerificationRun {
        output,
        classified,
        metric_set,
        thresholds,
    })
}

/// Prove the run's circuit and settle the proof into `store`.
///
/// A non-compliant run fails here with [`EngineError::Proof`]: the backend
/// refuses to prove it, and the store is left untouched.
pub fn prove_and_settle<P: ProofSystem>(
    run: &VerificationRun,
    proof_system: &P,
    pk: &P::ProvingKey,
    vk: &P::VerifyingKey,
    store: &dyn StateStore,
) -> Result<SettlementRecord, EngineError> {
    let circuit = run.circuit();
    let proof = proof_system.prove(pk, &circuit)?;
    Ok(settle(store, proof_system, vk, &proof, circuit.public_output())?)
}
