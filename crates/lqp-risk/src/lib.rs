//! # lqp-risk — Risk Classification and Compliance Metrics
//!
//! Maps each contract to a framework-specific regulatory category,
//! re-aggregates the temporal flow data by category, and evaluates the
//! framework's liquidity metrics against configured thresholds.
//!
//! | Framework | Taxonomy | Primary metric |
//! |-----------|----------|----------------|
//! | `basel3` | [`HqlaLevel`] | LCR, optional NSFR |
//! | `advanced` | [`FundingStability`] | cumulative liquidity ratio |
//! | `stablecoin` | [`ReserveAsset`] | reserve backing, optional concentration and quality share |
//!
//! All arithmetic is integer `i128` with truncating division; see
//! [`ratio`] for the ratio policy.

pub mod advanced;
pub mod basel3;
pub mod category;
pub mod classified;
pub mod classifier;
pub mod metrics;
pub mod ratio;
pub mod stablecoin;
pub mod thresholds;

pub use advanced::{AdvancedClassifier, FundingStability};
pub use basel3::{Basel3Classifier, HqlaLevel};
pub use category::RegulatoryCategory;
pub use classified::{Classified, ClassifiedData};
pub use classifier::{classify, classify_named, ClassifyParams, RiskClassifier};
pub use metrics::{compute_metrics, MetricReport, MetricSet, RiskMetrics};
pub use ratio::{ratio_pct, Fraction, RATIO_CEILING};
pub use stablecoin::{ReserveAsset, StableCoinClassifier};
pub use thresholds::{Direction, MetricKind, Threshold, ThresholdSet};
