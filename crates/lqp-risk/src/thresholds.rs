//! # Metric Thresholds
//!
//! Threshold inputs are explicit configuration values. [`ThresholdSet`]
//! validates a `{metric key -> threshold}` map against the framework's
//! metric catalogue:
//!
//! | Framework | Key | Direction | Required |
//! |-----------|-----|-----------|----------|
//! | basel3 | `lcr` | at least | yes |
//! | basel3 | `nsfr` | at least | no |
//! | advanced | `cumulative_liquidity` | at least | yes |
//! | stablecoin | `backing` | at least | yes |
//! | stablecoin | `concentration` | at most | no |
//! | stablecoin | `high_quality_share` | at least | no |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lqp_core::{Framework, LiquidityError, VerificationConfig};

use crate::ratio::RATIO_CEILING;

/// Which side of the threshold passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `ratio >= threshold - tolerance`.
    AtLeast,
    /// `ratio <= threshold + tolerance`.
    AtMost,
}

impl Direction {
    pub fn code(&self) -> u64 {
        match self {
            Self::AtLeast => 0,
            Self::AtMost => 1,
        }
    }
}

/// A compliance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Lcr,
    Nsfr,
    CumulativeLiquidity,
    Backing,
    Concentration,
    HighQualityShare,
}

impl MetricKind {
    /// Metrics of `framework`, primary first.
    pub fn catalogue(framework: Framework) -> &'static [MetricKind] {
        match framework {
            Framework::Basel3 => &[Self::Lcr, Self::Nsfr],
            Framework::Advanced => &[Self::CumulativeLiquidity],
            Framework::StableCoin => &[Self::Backing, Self::Concentration, Self::HighQualityShare],
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Lcr => "lcr",
            Self::Nsfr => "nsfr",
            Self::CumulativeLiquidity => "cumulative_liquidity",
            Self::Backing => "backing",
            Self::Concentration => "concentration",
            Self::HighQualityShare => "high_quality_share",
        }
    }

    /// Numeric code committed in the metric bundle leaf.
    pub fn code(&self) -> u64 {
        match self {
            Self::Lcr => 1,
            Self::Nsfr => 2,
            Self::CumulativeLiquidity => 3,
            Self::Backing => 4,
            Self::Concentration => 5,
            Self::HighQualityShare => 6,
        }
    }

    pub fn framework(&self) -> Framework {
        match self {
            Self::Lcr | Self::Nsfr => Framework::Basel3,
            Self::CumulativeLiquidity => Framework::Advanced,
            Self::Backing | Self::Concentration | Self::HighQualityShare => Framework::StableCoin,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Concentration => Direction::AtMost,
            _ => Direction::AtLeast,
        }
    }

    /// The framework's primary metric is mandatory.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Lcr | Self::CumulativeLiquidity | Self::Backing)
    }

    /// Ratio reported when the denominator is zero.
    pub fn zero_denominator_ratio(&self) -> i128 {
        match self {
            Self::Concentration => 0,
            _ => RATIO_CEILING,
        }
    }

    /// True if the per-period value is itself a running ratio.
    pub fn is_cumulative(&self) -> bool {
        matches!(self, Self::CumulativeLiquidity)
    }
}

/// One validated threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub kind: MetricKind,
    /// Percentage points.
    pub value: i64,
    /// Percentage points.
    pub tolerance: i64,
}

impl Threshold {
    /// Apply the comparison rule for this metric's direction.
    pub fn passes(&self, ratio: i128) -> bool {
        let value = i128::from(self.value);
        let tolerance = i128::from(self.tolerance);
        match self.kind.direction() {
            Direction::AtLeast => ratio >= value - tolerance,
            Direction::AtMost => ratio <= value + tolerance,
        }
    }
}

/// Validated thresholds for a framework, in catalogue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub framework: Framework,
    pub tolerance: i64,
    pub thresholds: Vec<Threshold>,
}

impl ThresholdSet {
    /// Validate a raw threshold map.
    pub fn new(
        framework: Framework,
        raw: &BTreeMap<String, i64>,
        tolerance: i64,
    ) -> Result<Self, LiquidityError> {
        if tolerance < 0 {
            return Err(LiquidityError::config(format!(
                "tolerance must be >= 0, got {tolerance}"
            )));
        }
        let catalogue = MetricKind::catalogue(framework);
        if let Some(unknown) = raw
            .keys()
            .find(|k| !catalogue.iter().any(|m| m.key() == k.as_str()))
        {
            let known: Vec<&str> = catalogue.iter().map(MetricKind::key).collect();
            return Err(LiquidityError::config(format!(
                "unknown threshold {unknown:?} for {framework}; expected one of {known:?}"
            )));
        }
        let mut thresholds = Vec::new();
        for kind in catalogue {
            match raw.get(kind.key()) {
                Some(value) if *value <= 0 => {
                    return Err(LiquidityError::config(format!(
                        "threshold {} must be positive, got {value}",
                        kind.key()
                    )));
                }
                Some(value) => thresholds.push(Threshold {
                    kind: *kind,
                    value: *value,
                    tolerance,
                }),
                None if kind.is_required() => {
                    return Err(LiquidityError::config(format!(
                        "threshold {} is required for {framework}",
                        kind.key()
                    )));
                }
                None => {}
            }
        }
        Ok(Self {
            framework,
            tolerance,
            thresholds,
        })
    }

    /// Thresholds from a verification config.
    pub fn from_config(config: &VerificationConfig) -> Result<Self, LiquidityError> {
        Self::new(config.framework, &config.thresholds, config.tolerance)
    }

    /// The required primary threshold.
    pub fn primary(&self) -> Option<&Threshold> {
        self.thresholds.first()
    }
}
