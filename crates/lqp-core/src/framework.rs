//! # Regulatory Frameworks
//!
//! The closed set of regulatory standards the pipeline can verify against.
//! Each variant selects one classifier, one category taxonomy and one set
//! of recognized threshold keys. Adding a framework forces every `match`
//! in the classifier, metric and encoding layers to handle it.
//!
//! Unknown names fail fast with [`LiquidityError::UnsupportedFramework`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::LiquidityError;

/// A supported regulatory framework.
///
/// | Code | Framework | Primary metric |
/// |------|-----------|----------------|
/// | 1 | Basel3 | Liquidity Coverage Ratio (plus optional NSFR) |
/// | 2 | Advanced | Cumulative liquidity ratio under stress |
/// | 3 | StableCoin | Reserve backing ratio |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    /// Basel III LCR/NSFR over HQLA levels.
    Basel3,
    /// Multi-period stress test over funding-stability buckets.
    Advanced,
    /// Stablecoin reserve backing over a reserve-asset taxonomy.
    #[serde(rename = "stablecoin")]
    StableCoin,
}

impl Framework {
    /// All frameworks in code order.
    pub fn all() -> &'static [Framework] {
        &[Self::Basel3, Self::Advanced, Self::StableCoin]
    }

    /// Lowercase identifier, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basel3 => "basel3",
            Self::Advanced => "advanced",
            Self::StableCoin => "stablecoin",
        }
    }

    /// Numeric code committed in the metric bundle leaf.
    pub fn code(&self) -> u64 {
        match self {
            Self::Basel3 => 1,
            Self::Advanced => 2,
            Self::StableCoin => 3,
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = LiquidityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basel3" | "basel_iii" => Ok(Self::Basel3),
            "advanced" => Ok(Self::Advanced),
            "stablecoin" | "stable_coin" => Ok(Self::StableCoin),
            _ => Err(LiquidityError::UnsupportedFramework(s.to_string())),
        }
    }
}
