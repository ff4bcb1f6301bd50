//! # Compliance Status
//!
//! The persisted status codes. The numbering belongs to the external
//! state contract, so codes are fixed and never reordered.

use serde::{Deserialize, Serialize};

/// Persisted compliance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum ComplianceStatus {
    /// No accepted proof yet.
    #[default]
    Unverified,
    /// A verifying proof of compliance was settled.
    Compliant,
}

impl ComplianceStatus {
    pub fn code(&self) -> u64 {
        match self {
            Self::Unverified => 100,
            Self::Compliant => 90,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            100 => Some(Self::Unverified),
            90 => Some(Self::Compliant),
            _ => None,
        }
    }
}

impl TryFrom<u64> for ComplianceStatus {
    type Error = String;

    fn try_from(code: u64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown compliance status code {code}"))
    }
}

impl From<ComplianceStatus> for u64 {
    fn from(status: ComplianceStatus) -> u64 {
        status.code()
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unverified => "UNVERIFIED",
            Self::Compliant => "COMPLIANT",
        };
        write!(f, "{s}({})", self.code())
    }
}
