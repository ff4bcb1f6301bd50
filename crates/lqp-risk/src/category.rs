//! # Regulatory Category Taxonomies
//!
//! Each framework classifies contracts into a closed, ordered taxonomy. The
//! order is load-bearing: it fixes the leaf layout of the commitment tree,
//! so [`RegulatoryCategory::all`] must never be reordered.

use std::fmt::Debug;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use lqp_core::{Framework, LiquidityError};

/// A framework's category set.
pub trait RegulatoryCategory:
    Copy + Eq + Ord + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Framework this taxonomy belongs to.
    const FRAMEWORK: Framework;

    /// Every category, in commitment order.
    fn all() -> &'static [Self];

    /// Canonical label.
    fn as_str(&self) -> &'static str;

    /// The category unlabeled contracts fall into.
    fn conservative_default() -> Self;

    /// Parse a normalized label (uppercase ASCII alphanumerics only).
    fn from_normalized_label(label: &str) -> Option<Self>;

    /// Position in [`all`](Self::all).
    fn index(&self) -> usize {
        Self::all().iter().position(|c| c == self).unwrap_or(0)
    }

    /// Resolve a contract's label: missing means the conservative default,
    /// unknown is an error naming the contract.
    fn resolve(label: Option<&str>, contract_id: &str) -> Result<Self, LiquidityError> {
        let Some(raw) = label else {
            return Ok(Self::conservative_default());
        };
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self::from_normalized_label(&normalized).ok_or_else(|| {
            LiquidityError::invalid_input(
                contract_id,
                format!("category {raw:?} is not in the {} taxonomy", Self::FRAMEWORK),
            )
        })
    }
}
