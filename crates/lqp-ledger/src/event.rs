//! # Contract and Event Records
//!
//! [`RawContract`] / [`RawEvent`] mirror the upstream feed as delivered.
//! [`Event`] is the normalized form: parsed timestamp, fixed-point payoff,
//! validated contract id, and the contract's position in the input list.
//!
//! Payoffs are accepted as JSON integers (whole units) or decimal strings.
//! A float payoff is rejected at deserialization with a message naming the
//! value.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use lqp_core::{Amount, ContractId, Timestamp};

/// A contract as delivered by the event feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContract {
    pub id: String,
    /// Regulatory category label in the framework's taxonomy. Missing
    /// labels resolve to the most conservative category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// One dated cash-flow event as delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Feed event type code (e.g. `IP`, `MD`, `PR`). Informational.
    #[serde(rename = "type")]
    pub event_type: String,
    /// ISO-8601 instant.
    pub time: String,
    pub payoff: RawPayoff,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A payoff as written in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPayoff {
    /// Whole units.
    Integer(i64),
    /// Decimal string with up to six fractional digits.
    Decimal(String),
}

impl RawPayoff {
    /// Convert to a fixed-point [`Amount`].
    pub fn to_amount(&self) -> Result<Amount, String> {
        match self {
            Self::Integer(units) => Amount::from_units(*units)
                .ok_or_else(|| format!("payoff {units} overflows fixed-point range")),
            Self::Decimal(s) => Amount::parse_decimal(s).map_err(|e| e.to_string()),
        }
    }
}

impl Serialize for RawPayoff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Decimal(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for RawPayoff {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PayoffVisitor;

        impl Visitor<'_> for PayoffVisitor {
            type Value = RawPayoff;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an integer or a decimal string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawPayoff, E> {
                Ok(RawPayoff::Integer(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawPayoff, E> {
                i64::try_from(v)
                    .map(RawPayoff::Integer)
                    .map_err(|_| E::custom(format!("payoff {v} out of range")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawPayoff, E> {
                Err(E::custom(format!(
                    "float payoff {v} rejected; use an integer or a decimal string"
                )))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RawPayoff, E> {
                Ok(RawPayoff::Decimal(v.to_string()))
            }
        }

        deserializer.deserialize_any(PayoffVisitor)
    }
}

/// A normalized event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    pub timestamp: Timestamp,
    /// Signed payoff: positive is an inflow, negative an outflow.
    pub payoff: Amount,
    pub contract_id: ContractId,
    /// Position of the owning contract in the input list.
    pub contract_index: usize,
    /// The owning contract's category label, if any.
    pub category_hint: Option<String>,
}
