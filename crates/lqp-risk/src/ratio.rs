//! # Integer Ratio Policy
//!
//! All compliance ratios are integer percentage points computed with
//! truncating division in `i128`, the same arithmetic a constrained
//! circuit performs:
//!
//! ```text
//! ratio = trunc(numerator / denominator)      numerator already scaled by 100
//! denominator == 0  =>  zero-denominator value (RATIO_CEILING unless stated)
//! ratio > RATIO_CEILING  =>  RATIO_CEILING
//! ```
//!
//! Numerators carry the percentage scaling (and any percent weights), so
//! `ratio_pct(a, b) == trunc(100 * a / b)`. Scaling, weighting and
//! accumulation are checked; `None` means the value left `i128`.

use serde::{Deserialize, Serialize};

/// Largest representable ratio, in percentage points. Also the value of a
/// coverage ratio whose obligations are zero.
pub const RATIO_CEILING: i128 = 999_999;

/// A scaled numerator over a denominator, both in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    /// Numerator including the x100 percentage scale.
    pub numerator: i128,
    pub denominator: i128,
}

impl Fraction {
    /// `100 * num / den`.
    pub fn pct(num: i128, den: i128) -> Option<Self> {
        Some(Self {
            numerator: num.checked_mul(100)?,
            denominator: den,
        })
    }

    /// A numerator that already carries percent weights.
    pub fn weighted(num_pct: i128, den: i128) -> Self {
        Self {
            numerator: num_pct,
            denominator: den,
        }
    }

    /// Component-wise sum (used for running cumulative ratios).
    pub fn accumulate(self, other: Self) -> Option<Self> {
        Some(Self {
            numerator: self.numerator.checked_add(other.numerator)?,
            denominator: self.denominator.checked_add(other.denominator)?,
        })
    }

    /// Evaluate under the ratio policy.
    pub fn ratio(&self, on_zero_denominator: i128) -> i128 {
        if self.denominator == 0 {
            return on_zero_denominator;
        }
        (self.numerator / self.denominator).min(RATIO_CEILING)
    }
}

/// `trunc(100 * num / den)`, ceiling on a zero denominator.
pub fn ratio_pct(num: i128, den: i128) -> Option<i128> {
    Fraction::pct(num, den).map(|f| f.ratio(RATIO_CEILING))
}

/// Sum of `amount * weight_pct` over weighted pairs.
pub fn weighted_sum(pairs: impl IntoIterator<Item = (i128, i128)>) -> Option<i128> {
    pairs.into_iter().try_fold(0i128, |acc, (amount, weight)| {
        acc.checked_add(amount.checked_mul(weight)?)
    })
}

/// Sum of plain values.
pub fn checked_total(values: impl IntoIterator<Item = i128>) -> Option<i128> {
    values.into_iter().try_fold(0i128, i128::checked_add)
}
