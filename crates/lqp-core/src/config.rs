//! # Verification Configuration
//!
//! Every input that shapes a verification result besides the event feed
//! itself: framework, bucketing, thresholds, tolerance, haircut policy. It
//! is passed explicitly into each pipeline call; there is no process-wide
//! default registry.
//!
//! Deserialization is two-stage. The document form ([`ConfigDocument`])
//! mirrors the file and rejects unknown fields; [`VerificationConfig`] is
//! the validated form, where framework and policy names have been resolved
//! and structural ranges checked. Threshold *keys* are validated later,
//! against the framework's metric set, by the metric calculator.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, Hash32};
use crate::error::LiquidityError;
use crate::framework::Framework;
use crate::temporal::{PeriodType, Timestamp};

/// How HQLA levels are weighted when computing Basel III ratios.
///
/// This is a named, versioned parameter. The classifier always reports
/// unweighted level totals; the policy is applied by the metric calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaircutPolicy {
    /// Every HQLA level counts at face value.
    #[default]
    Unweighted,
    /// Basel III (2013) weights: L1 100%, L2A 85%, L2B 50%.
    Basel3Standard,
}

impl HaircutPolicy {
    /// snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unweighted => "unweighted",
            Self::Basel3Standard => "basel3_standard",
        }
    }

    /// Numeric code committed in the metric bundle leaf.
    pub fn code(&self) -> u64 {
        match self {
            Self::Unweighted => 0,
            Self::Basel3Standard => 1,
        }
    }
}

impl FromStr for HaircutPolicy {
    type Err = LiquidityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unweighted" | "none" => Ok(Self::Unweighted),
            "basel3_standard" | "basel3_2013" => Ok(Self::Basel3Standard),
            _ => Err(LiquidityError::UnsupportedFramework(format!(
                "haircut policy {s:?}"
            ))),
        }
    }
}

/// The configuration file as written.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    /// Framework name, resolved via [`Framework::from_str`].
    pub framework: String,
    /// Bucketing unit.
    pub period_type: PeriodType,
    /// Units of `period_type` per bucket.
    #[serde(default = "default_period_size")]
    pub period_size: u32,
    /// Explicit bucketing origin.
    #[serde(default)]
    pub start_date: Option<Timestamp>,
    /// Explicit last instant; later events fold into the final period.
    #[serde(default)]
    pub end_date: Option<Timestamp>,
    /// When set, events in any other currency are rejected.
    #[serde(default)]
    pub base_currency: Option<String>,
    /// Metric key to threshold in percentage points.
    pub thresholds: BTreeMap<String, i64>,
    /// Tolerance in percentage points.
    #[serde(default)]
    pub tolerance: i64,
    /// Haircut policy name.
    #[serde(default)]
    pub haircut_policy: Option<String>,
}

fn default_period_size() -> u32 {
    1
}

/// Validated verification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerificationConfig {
    pub framework: Framework,
    pub period_type: PeriodType,
    pub period_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_currency: Option<String>,
    pub thresholds: BTreeMap<String, i64>,
    #[serde(default)]
    pub tolerance: i64,
    #[serde(default)]
    pub haircut_policy: HaircutPolicy,
}

impl VerificationConfig {
    /// A monthly config for `framework` with the given thresholds and all
    /// other options at their defaults.
    pub fn new(framework: Framework, thresholds: BTreeMap<String, i64>) -> Self {
        Self {
            framework,
            period_type: PeriodType::Month,
            period_size: 1,
            start_date: None,
            end_date: None,
            base_currency: None,
            thresholds,
            tolerance: 0,
            haircut_policy: HaircutPolicy::default(),
        }
    }

    /// Resolve names and check structural ranges.
    pub fn from_document(doc: ConfigDocument) -> Result<Self, LiquidityError> {
        let framework = doc.framework.parse::<Framework>()?;
        let haircut_policy = match doc.haircut_policy.as_deref() {
            Some(name) => name.parse::<HaircutPolicy>()?,
            None => HaircutPolicy::default(),
        };
        let base_currency = doc
            .base_currency
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty());
        let config = Self {
            framework,
            period_type: doc.period_type,
            period_size: doc.period_size,
            start_date: doc.start_date,
            end_date: doc.end_date,
            base_currency,
            thresholds: doc.thresholds,
            tolerance: doc.tolerance,
            haircut_policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, LiquidityError> {
        let doc: ConfigDocument = serde_yaml::from_str(s)
            .map_err(|e| LiquidityError::config(format!("invalid YAML config: {e}")))?;
        Self::from_document(doc)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, LiquidityError> {
        let doc: ConfigDocument = serde_json::from_str(s)
            .map_err(|e| LiquidityError::config(format!("invalid JSON config: {e}")))?;
        Self::from_document(doc)
    }

    /// Structural checks independent of the event data.
    pub fn validate(&self) -> Result<(), LiquidityError> {
        if self.period_size == 0 {
            return Err(LiquidityError::config("period_size must be >= 1"));
        }
        if self.tolerance < 0 {
            return Err(LiquidityError::config(format!(
                "tolerance must be >= 0, got {}",
                self.tolerance
            )));
        }
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            if end < start {
                return Err(LiquidityError::config(format!(
                    "end_date {end} precedes start_date {start}"
                )));
            }
        }
        if self.thresholds.is_empty() {
            return Err(LiquidityError::config("no thresholds configured"));
        }
        Ok(())
    }

    /// SHA-256 over the JCS form of this config, reported for audit.
    pub fn digest(&self) -> Result<Hash32, LiquidityError> {
        Ok(sha256_digest(&CanonicalBytes::new(self)?))
    }
}
