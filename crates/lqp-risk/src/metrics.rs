//! # Metric Calculator
//!
//! Evaluates every configured threshold against the classified data,
//! period by period.
//!
//! ## Compliance Invariant
//!
//! `overall_compliant == all(per_period_compliance)` for each metric, and a
//! run is compliant only if every configured metric is. Average and
//! worst-case values are diagnostics; they never gate compliance.

use serde::{Deserialize, Serialize};

use lqp_core::{Framework, HaircutPolicy, LiquidityError};

use crate::advanced::cumulative_liquidity_fractions;
use crate::basel3::{lcr_fraction, nsfr_fraction};
use crate::classified::Classified;
use crate::ratio::{checked_total, Fraction};
use crate::stablecoin::{backing_fraction, concentration_fraction, high_quality_fraction};
use crate::thresholds::{Direction, MetricKind, Threshold, ThresholdSet};

/// Per-period and aggregate values of one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub period_metrics: Vec<i128>,
    pub cumulative_metrics: Vec<i128>,
    pub average_metric: i128,
    pub worst_case_metric: i128,
    pub per_period_compliance: Vec<bool>,
    pub overall_compliant: bool,
}

/// One metric evaluated against its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricReport {
    pub kind: MetricKind,
    pub direction: Direction,
    pub threshold: i64,
    pub tolerance: i64,
    pub metrics: RiskMetrics,
}

/// Every configured metric for a run, primary first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSet {
    pub framework: Framework,
    pub haircut_policy: HaircutPolicy,
    pub periods_count: usize,
    pub reports: Vec<MetricReport>,
    pub overall_compliant: bool,
}

impl MetricSet {
    /// The framework's primary metric.
    pub fn primary(&self) -> Option<&MetricReport> {
        self.reports.first()
    }

    /// Optional metrics that were configured.
    pub fn secondary(&self) -> &[MetricReport] {
        self.reports.get(1..).unwrap_or(&[])
    }

    /// Look up a metric by kind.
    pub fn report(&self, kind: MetricKind) -> Option<&MetricReport> {
        self.reports.iter().find(|r| r.kind == kind)
    }
}

/// Compute every configured metric.
///
/// `expected_periods` is the temporal data's `periods_count`; a mismatch
/// with the classified data is a `ConfigMismatch`.
pub fn compute_metrics(
    classified: &Classified,
    thresholds: &ThresholdSet,
    expected_periods: usize,
) -> Result<MetricSet, LiquidityError> {
    let framework = classified.framework();
    if thresholds.framework != framework {
        return Err(LiquidityError::config(format!(
            "thresholds are for {} but data is classified under {framework}",
            thresholds.framework
        )));
    }
    let periods_count = classified.periods_count();
    if periods_count != expected_periods {
        return Err(LiquidityError::config(format!(
            "classified data has {periods_count} periods, temporal data has {expected_periods}"
        )));
    }
    if periods_count == 0 {
        return Err(LiquidityError::NoData {
            reason: "classified data has no periods".into(),
        });
    }
    if thresholds.thresholds.is_empty() {
        return Err(LiquidityError::config("no thresholds to evaluate"));
    }
    classified.check_conservation()?;

    let reports = thresholds
        .thresholds
        .iter()
        .map(|t| {
            let fractions = fractions(t.kind, classified)?;
            Ok(MetricReport {
                kind: t.kind,
                direction: t.kind.direction(),
                threshold: t.value,
                tolerance: t.tolerance,
                metrics: evaluate(t, &fractions)?,
            })
        })
        .collect::<Result<Vec<_>, LiquidityError>>()?;

    let overall_compliant = reports.iter().all(|r| r.metrics.overall_compliant);
    for r in &reports {
        tracing::debug!(
            metric = r.kind.key(),
            worst = %r.metrics.worst_case_metric,
            compliant = r.metrics.overall_compliant,
            "metric evaluated"
        );
    }
    Ok(MetricSet {
        framework,
        haircut_policy: classified.haircut_policy(),
        periods_count,
        reports,
        overall_compliant,
    })
}

fn fractions(kind: MetricKind, classified: &Classified) -> Result<Vec<Fraction>, LiquidityError> {
    let per_period = |f: &dyn Fn(usize) -> Result<Fraction, LiquidityError>| {
        (0..classified.periods_count()).map(f).collect::<Result<Vec<_>, _>>()
    };
    match (kind, classified) {
        (MetricKind::Lcr, Classified::Basel3(d)) => per_period(&|p| lcr_fraction(d, p)),
        (MetricKind::Nsfr, Classified::Basel3(d)) => per_period(&|p| nsfr_fraction(d, p)),
        (MetricKind::CumulativeLiquidity, Classified::Advanced(d)) => {
            cumulative_liquidity_fractions(d)
        }
        (MetricKind::Backing, Classified::StableCoin(d)) => {
            per_period(&|p| backing_fraction(d, p))
        }
        (MetricKind::Concentration, Classified::StableCoin(d)) => {
            per_period(&|p| concentration_fraction(d, p))
        }
        (MetricKind::HighQualityShare, Classified::StableCoin(d)) => {
            per_period(&|p| high_quality_fraction(d, p))
        }
        (kind, other) => Err(LiquidityError::config(format!(
            "metric {} is not defined for {}",
            kind.key(),
            other.framework()
        ))),
    }
}

fn evaluate(threshold: &Threshold, fractions: &[Fraction]) -> Result<RiskMetrics, LiquidityError> {
    let kind = threshold.kind;
    let on_zero = kind.zero_denominator_ratio();
    let period_metrics: Vec<i128> = fractions.iter().map(|f| f.ratio(on_zero)).collect();

    let cumulative_metrics = if kind.is_cumulative() {
        period_metrics.clone()
    } else {
        let mut running = Fraction::default();
        fractions
            .iter()
            .enumerate()
            .map(|(p, f)| {
                running = running.accumulate(*f).ok_or_else(|| {
                    let field = format!("cumulative {}", kind.key());
                    LiquidityError::overflow(field, Some(p), f.numerator)
                })?;
                Ok(running.ratio(on_zero))
            })
            .collect::<Result<Vec<_>, LiquidityError>>()?
    };

    let n = period_metrics.len().max(1) as i128;
    let average_metric = checked_total(period_metrics.iter().copied())
        .ok_or_else(|| {
            LiquidityError::overflow(format!("average {}", kind.key()), None, i128::MAX)
        })?
        / n;
    let worst_case_metric = match kind.direction() {
        Direction::AtLeast => period_metrics.iter().copied().min(),
        Direction::AtMost => period_metrics.iter().copied().max(),
    }
    .unwrap_or(0);

    let per_period_compliance: Vec<bool> =
        period_metrics.iter().map(|r| threshold.passes(*r)).collect();
    let overall_compliant = per_period_compliance.iter().all(|ok| *ok);

    Ok(RiskMetrics {
        period_metrics,
        cumulative_metrics,
        average_metric,
        worst_case_metric,
        per_period_compliance,
        overall_compliant,
    })
}
