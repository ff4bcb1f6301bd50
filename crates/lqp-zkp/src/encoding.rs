//! # Leaf Encoding
//!
//! Turns classified data, metrics and the scenario identifier into the
//! ordered leaf payloads of the commitment tree. The circuit re-executes
//! exactly this code path, so any change here changes every root.
//!
//! ## Layout
//!
//! For a taxonomy of `n` categories:
//!
//! | Slot | Payload |
//! |------|---------|
//! | `0` | `SHA256(0x04 \|\| utf8(scenario_id))` |
//! | `1..=n` | `fold(inflow series of category k)` |
//! | `n+1..=2n` | `fold(outflow series of category k)` |
//! | `2n+1` | `fold(net flows)` |
//! | `2n+2` | `fold(metric bundle words)` |
//!
//! Each slot's leaf hash is `SHA256(0x00 || payload)`.

use sha2::{Digest, Sha256};

use lqp_core::{Amount, Hash32, LiquidityError, ScenarioId};
use lqp_crypto::{
    encode_bool, encode_hash, encode_scalar, encode_u64, fold_bools, fold_scalars_indexed,
    fold_words, leaf_hash, Word, TREE_CAPACITY,
};
use lqp_risk::{Classified, MetricReport, MetricSet};

/// Domain tag for the scenario identifier payload.
pub const TAG_SCENARIO: u8 = 0x04;

/// Slot assignment for a taxonomy of `categories` buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafLayout {
    categories: usize,
}

impl LeafLayout {
    pub const SCENARIO: usize = 0;

    /// # Errors
    ///
    /// `EncodingOverflow` when the layout needs more slots than the tree
    /// holds.
    pub fn new(categories: usize) -> Result<Self, LiquidityError> {
        let layout = Self { categories };
        if layout.leaf_count() > TREE_CAPACITY {
            return Err(LiquidityError::EncodingOverflow {
                field: "leaf layout".into(),
                period: None,
                value: layout.leaf_count() as i128,
            });
        }
        Ok(layout)
    }

    pub fn for_classified(classified: &Classified) -> Result<Self, LiquidityError> {
        Self::new(classified.category_count())
    }

    pub fn categories(&self) -> usize {
        self.categories
    }

    pub fn inflow(&self, category: usize) -> usize {
        1 + category
    }

    pub fn outflow(&self, category: usize) -> usize {
        1 + self.categories + category
    }

    pub fn net_flows(&self) -> usize {
        2 * self.categories + 1
    }

    pub fn metric_bundle(&self) -> usize {
        2 * self.categories + 2
    }

    pub fn leaf_count(&self) -> usize {
        2 * self.categories + 3
    }

    /// Human-readable label of a slot, for diagnostics.
    pub fn describe(&self, slot: usize, labels: &[&str]) -> String {
        let n = self.categories;
        match slot {
            0 => "scenario".into(),
            s if s <= n => format!("inflows[{}]", labels.get(s - 1).unwrap_or(&"?")),
            s if s <= 2 * n => format!("outflows[{}]", labels.get(s - 1 - n).unwrap_or(&"?")),
            s if s == self.net_flows() => "net_flows".into(),
            s if s == self.metric_bundle() => "metric_bundle".into(),
            s => format!("empty[{s}]"),
        }
    }
}

/// `SHA256(0x04 || utf8(scenario_id))`.
pub fn scenario_payload(scenario: &ScenarioId) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update([TAG_SCENARIO]);
    hasher.update(scenario.as_str().as_bytes());
    Hash32(hasher.finalize().into())
}

/// Fold a per-period amount series. An overflow reports the series name
/// and the offending period.
pub fn series_payload(field: &str, series: &[Amount]) -> Result<Hash32, LiquidityError> {
    let minors: Vec<i128> = series.iter().map(|a| a.minor()).collect();
    fold_scalars_indexed(&minors).map_err(|(period, _)| LiquidityError::EncodingOverflow {
        field: field.to_string(),
        period: Some(period),
        value: minors.get(period).copied().unwrap_or_default(),
    })
}

/// Word sequence of the metric/threshold bundle.
pub fn metric_bundle_words(metrics: &MetricSet) -> Result<Vec<Word>, LiquidityError> {
    let mut words = vec![
        encode_u64(metrics.framework.code()),
        encode_u64(metrics.haircut_policy.code()),
        encode_u64(metrics.periods_count as u64),
        encode_u64(metrics.reports.len() as u64),
    ];
    for report in &metrics.reports {
        push_report(&mut words, report)?;
    }
    words.push(encode_bool(metrics.overall_compliant));
    Ok(words)
}

fn push_report(words: &mut Vec<Word>, report: &MetricReport) -> Result<(), LiquidityError> {
    let key = report.kind.key();
    let scalar = |name: &str, value: i128| {
        encode_scalar(value).map_err(|_| LiquidityError::EncodingOverflow {
            field: format!("{key}.{name}"),
            period: None,
            value,
        })
    };
    let m = &report.metrics;
    let folded = |name: &str, values: &[i128]| {
        fold_scalars_indexed(values).map_err(|(period, _)| LiquidityError::EncodingOverflow {
            field: format!("{key}.{name}"),
            period: Some(period),
            value: values.get(period).copied().unwrap_or_default(),
        })
    };
    let period_metrics = folded("period_metrics", &m.period_metrics)?;
    let cumulative_metrics = folded("cumulative_metrics", &m.cumulative_metrics)?;

    words.push(encode_u64(report.kind.code()));
    words.push(encode_u64(report.direction.code()));
    words.push(scalar("threshold", i128::from(report.threshold))?);
    words.push(scalar("tolerance", i128::from(report.tolerance))?);
    words.push(encode_hash(&period_metrics));
    words.push(encode_hash(&cumulative_metrics));
    words.push(encode_hash(&fold_bools(&m.per_period_compliance)));
    words.push(scalar("average_metric", m.average_metric)?);
    words.push(scalar("worst_case_metric", m.worst_case_metric)?);
    words.push(encode_bool(m.overall_compliant));
    Ok(())
}

/// Leaf payloads in slot order.
///
/// # Errors
///
/// `ConfigMismatch` when `metrics` was computed for a different framework
/// or period count, `EncodingOverflow` when any committed value exceeds
/// the word range.
pub fn leaf_payloads(
    classified: &Classified,
    metrics: &MetricSet,
    scenario: &ScenarioId,
) -> Result<Vec<Hash32>, LiquidityError> {
    if metrics.framework != classified.framework()
        || metrics.periods_count != classified.periods_count()
    {
        return Err(LiquidityError::config(format!(
            "metrics ({}, {} periods) do not belong to classified data ({}, {} periods)",
            metrics.framework,
            metrics.periods_count,
            classified.framework(),
            classified.periods_count()
        )));
    }
    let layout = LeafLayout::for_classified(classified)?;
    let labels = classified.category_labels();

    let mut payloads = Vec::with_capacity(layout.leaf_count());
    payloads.push(scenario_payload(scenario));
    for (k, series) in classified.inflow_series().iter().enumerate() {
        let label = labels.get(k).copied().unwrap_or("?");
        payloads.push(series_payload(&format!("inflows[{label}]"), series)?);
    }
    for (k, series) in classified.outflow_series().iter().enumerate() {
        let label = labels.get(k).copied().unwrap_or("?");
        payloads.push(series_payload(&format!("outflows[{label}]"), series)?);
    }
    payloads.push(series_payload("net_flows", classified.net_flows())?);
    payloads.push(fold_words(&metric_bundle_words(metrics)?));
    debug_assert_eq!(payloads.len(), layout.leaf_count());
    Ok(payloads)
}

/// Leaf hashes in slot order.
pub fn encode_leaves(
    classified: &Classified,
    metrics: &MetricSet,
    scenario: &ScenarioId,
) -> Result<Vec<Hash32>, LiquidityError> {
    Ok(leaf_payloads(classified, metrics, scenario)?
        .iter()
        .map(|p| leaf_hash(p.as_bytes()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{advanced_run, basel3_run};

    #[test]
    fn layout_slots() {
        let layout = LeafLayout::new(4).unwrap();
        assert_eq!(layout.inflow(0), 1);
        assert_eq!(layout.outflow(0), 5);
        assert_eq!(layout.net_flows(), 9);
        assert_eq!(layout.metric_bundle(), 10);
        assert_eq!(layout.leaf_count(), 11);
        let labels = ["L1", "L2A", "L2B", "NonHQLA"];
        assert_eq!(layout.describe(2, &labels), "inflows[L2A]");
        assert_eq!(layout.describe(8, &labels), "outflows[NonHQLA]");
        assert_eq!(layout.describe(10, &labels), "metric_bundle");
    }

    #[test]
    fn oversized_taxonomy_is_rejected() {
        assert!(LeafLayout::new(14).is_ok());
        assert!(matches!(
            LeafLayout::new(15),
            Err(LiquidityError::EncodingOverflow { .. })
        ));
    }

    #[test]
    fn leaf_count_follows_taxonomy() {
        let (classified, metrics, scenario) = basel3_run();
        assert_eq!(encode_leaves(&classified, &metrics, &scenario).unwrap().len(), 11);
        let (classified, metrics, scenario) = advanced_run();
        assert_eq!(encode_leaves(&classified, &metrics, &scenario).unwrap().len(), 9);
    }

    #[test]
    fn scenario_payload_is_tagged() {
        let s = ScenarioId::new("bank-a").unwrap();
        let mut hasher = Sha256::new();
        hasher.update(b"bank-a");
        let untagged = Hash32(hasher.finalize().into());
        assert_ne!(scenario_payload(&s), untagged);
        assert_ne!(scenario_payload(&s), scenario_payload(&ScenarioId::new("bank-b").unwrap()));
    }

    #[test]
    fn bundle_words_shape() {
        let (_, metrics, _) = advanced_run();
        let words = metric_bundle_words(&metrics).unwrap();
        // 4 header words, 10 per metric, 1 overall flag.
        assert_eq!(words.len(), 4 + 10 * metrics.reports.len() + 1);
        assert_eq!(words[0], encode_u64(2));
        assert_eq!(words.last(), Some(&encode_bool(false)));
    }

    #[test]
    fn bundle_binds_cumulative_series() {
        let (classified, metrics, scenario) = advanced_run();
        let mut altered = metrics.clone();
        altered.reports[0].metrics.cumulative_metrics[0] += 1;
        assert_ne!(metric_bundle_words(&metrics).unwrap(), metric_bundle_words(&altered).unwrap());

        let leaves = leaf_payloads(&classified, &metrics, &scenario).unwrap();
        let altered_leaves = leaf_payloads(&classified, &altered, &scenario).unwrap();
        assert_ne!(leaves.last(), altered_leaves.last());
        assert_eq!(leaves[..leaves.len() - 1], altered_leaves[..altered_leaves.len() - 1]);
    }

    #[test]
    fn overflowing_series_reports_period() {
        let series = [Amount::ZERO, Amount::from_minor(i128::from(u64::MAX) + 1)];
        match series_payload("inflows[L1]", &series) {
            Err(LiquidityError::EncodingOverflow { field, period, .. }) => {
                assert_eq!(field, "inflows[L1]");
                assert_eq!(period, Some(1));
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn foreign_metrics_are_rejected() {
        let (classified, _, scenario) = advanced_run();
        let (_, basel_metrics, _) = basel3_run();
        assert!(matches!(
            leaf_payloads(&classified, &basel_metrics, &scenario),
            Err(LiquidityError::ConfigMismatch { .. })
        ));
    }
}
