//! # Identifier Newtypes
//!
//! Contract and scenario identifiers are distinct types so a contract id can
//! never be committed where the scenario id belongs. Both are validated at
//! construction: trimmed, non-empty, at most [`MAX_IDENTIFIER_LEN`] bytes.

use serde::{Deserialize, Serialize};

use crate::error::LiquidityError;

/// Upper bound on identifier length in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 256;

fn validate(kind: &str, raw: &str) -> Result<String, LiquidityError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LiquidityError::invalid_input(raw, format!("{kind} must not be empty")));
    }
    if trimmed.len() > MAX_IDENTIFIER_LEN {
        let prefix: String = trimmed.chars().take(32).collect();
        return Err(LiquidityError::invalid_input(
            prefix,
            format!("{kind} exceeds {MAX_IDENTIFIER_LEN} bytes"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Identifier of a financial contract in the raw event feed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractId(String);

impl ContractId {
    /// Validate and wrap a contract identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, LiquidityError> {
        validate("contract id", raw.as_ref()).map(Self)
    }

    /// The identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of the scenario (company, stress scenario, reporting run)
/// a commitment is bound to. Committed as leaf 0 of the tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Validate and wrap a scenario identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, LiquidityError> {
        validate("scenario id", raw.as_ref()).map(Self)
    }

    /// The identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl TryFrom<String> for $t {
            type Error = LiquidityError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$t> for String {
            fn from(id: $t) -> String {
                id.0
            }
        }

        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

impl_string_newtype!(ContractId);
impl_string_newtype!(ScenarioId);
