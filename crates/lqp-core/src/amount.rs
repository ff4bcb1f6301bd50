//! # Fixed-Point Amounts
//!
//! Every monetary value in the pipeline is an `Amount`: a signed integer
//! count of minor units at a fixed scale of 10^6. Aggregation, ratios and
//! commitment encoding stay in integer arithmetic end to end, which is what
//! lets a constrained-arithmetic circuit reproduce them exactly.
//!
//! ## Parsing
//!
//! External payoffs arrive either as JSON integers (whole units) or as
//! decimal strings with up to six fractional digits. Floats are rejected at
//! the input boundary, and so is excess precision: `"0.0000001"` cannot be
//! represented and is an error, never silently rounded.

use serde::{Deserialize, Serialize};

/// Number of fractional decimal digits carried by [`Amount`].
pub const AMOUNT_DECIMALS: u32 = 6;

/// Minor units per whole unit.
pub const AMOUNT_SCALE: i128 = 1_000_000;

/// A signed fixed-point monetary amount in minor units (scale 10^6).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i128);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(0);

    /// Construct from raw minor units.
    pub const fn from_minor(minor: i128) -> Self {
        Self(minor)
    }

    /// Construct from whole units. Returns `None` on overflow.
    pub fn from_units(units: i64) -> Option<Self> {
        (units as i128).checked_mul(AMOUNT_SCALE).map(Self)
    }

    /// Raw minor units.
    pub const fn minor(self) -> i128 {
        self.0
    }

    /// Absolute value.
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// True for strictly positive amounts.
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// True for strictly negative amounts.
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Sum of an iterator of amounts; `None` on `i128` overflow.
    pub fn checked_sum<'a>(items: impl IntoIterator<Item = &'a Amount>) -> Option<Self> {
        items
            .into_iter()
            .try_fold(Self::ZERO, |acc, a| acc.checked_add(*a))
    }

    /// Parse a decimal string such as `"1250"`, `"-42.5"` or `"0.000001"`.
    pub fn parse_decimal(s: &str) -> Result<Self, AmountParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountParseError::Empty);
        }
        let (negative, digits) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountParseError::Malformed(s.to_string()));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AmountParseError::Malformed(s.to_string()));
        }
        if frac.len() > AMOUNT_DECIMALS as usize {
            return Err(AmountParseError::ExcessPrecision(s.to_string()));
        }

        let whole_val: i128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountParseError::OutOfRange(s.to_string()))?
        };
        let mut frac_val: i128 = if frac.is_empty() {
            0
        } else {
            frac.parse()
                .map_err(|_| AmountParseError::Malformed(s.to_string()))?
        };
        for _ in frac.len()..AMOUNT_DECIMALS as usize {
            frac_val *= 10;
        }

        let magnitude = whole_val
            .checked_mul(AMOUNT_SCALE)
            .and_then(|w| w.checked_add(frac_val))
            .ok_or_else(|| AmountParseError::OutOfRange(s.to_string()))?;
        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = AMOUNT_SCALE as u128;
        write!(f, "{sign}{}.{:06}", abs / scale, abs % scale)
    }
}

/// Why a decimal amount string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    /// Empty string.
    Empty,
    /// Not a decimal number.
    Malformed(String),
    /// More than six fractional digits.
    ExcessPrecision(String),
    /// Does not fit in `i128` minor units.
    OutOfRange(String),
}

impl std::fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("empty amount"),
            Self::Malformed(s) => write!(f, "malformed decimal amount {s:?}"),
            Self::ExcessPrecision(s) => write!(
                f,
                "amount {s:?} has more than {AMOUNT_DECIMALS} fractional digits"
            ),
            Self::OutOfRange(s) => write!(f, "amount {s:?} is out of range"),
        }
    }
}

impl std::error::Error for AmountParseError {}
