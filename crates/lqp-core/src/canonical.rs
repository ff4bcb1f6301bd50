//! # Canonical Serialization
//!
//! `CanonicalBytes` is the only byte sequence that flows into JSON-level
//! digests in the stack: the configuration fingerprint reported next to a
//! verification result, and the mock proof over a circuit's public output.
//!
//! ## Invariants
//!
//! - Floats are rejected. Monetary values travel as integer minor units or
//!   decimal strings; a binary float has no single canonical rendering.
//! - Serialization is RFC 8785 (JCS) via `serde_jcs`: sorted keys, compact
//!   separators, UTF-8.
//!
//! The inner buffer is private, so a function that accepts `&CanonicalBytes`
//! cannot be handed bytes produced by any other serialization path.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced by float-rejecting JCS canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value tree contains a non-integer number,
    /// `SerializationFailed` if serde cannot render it.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the canonical byte sequence is empty (never the case for
    /// valid JSON, kept for clippy's `len_without_is_empty`).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f.into()));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_keys_compact_separators() {
        let data = serde_json::json!({"tolerance": 0, "framework": "basel3", "lcr": 100});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"framework":"basel3","lcr":100,"tolerance":0}"#
        );
    }

    #[test]
    fn nested_objects_are_sorted() {
        let data = serde_json::json!({"z": {"b": 2, "a": 1}, "a": [3, 1]});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"a":[3,1],"z":{"a":1,"b":2}}"#);
    }

    #[test]
    fn float_payoff_rejected() {
        let data = serde_json::json!({"payoff": 1250.75});
        match CanonicalBytes::new(&data) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 1250.75),
            other => panic!("expected FloatRejected, got {other:?}"),
        }
    }

    #[test]
    fn float_inside_array_rejected() {
        let data = serde_json::json!({"periods": [{"ratio": 0.87}]});
        assert!(CanonicalBytes::new(&data).is_err());
    }

    #[test]
    fn negative_and_large_integers_pass() {
        let data = serde_json::json!({"net": -42, "big": 18_446_744_073_709_551_615u64});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"big":18446744073709551615,"net":-42}"#);
    }
}
