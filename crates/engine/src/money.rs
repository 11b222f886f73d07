use std::{
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as integer **minor units**.
///
/// Use this type for **all** monetary values in the engine (totals, item
/// amounts, corrections) to avoid floating-point drift while balancing.
/// The scale is not stored: it comes from the currency's `decimals`, so
/// `Money::new(1050)` is `10.50` in a 2-decimals currency and `1050` in a
/// 0-decimals one.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!(Money::parse_major("10", 2).unwrap().minor(), 1000);
/// assert_eq!(Money::parse_major("10,5", 2).unwrap().minor(), 1050);
/// assert!(Money::parse_major("12.345", 2).is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest magnitude accepted from user input: amounts travel as JSON
    /// numbers, which hold integers exactly only up to `2^53 - 1`.
    pub const MAX_MINOR: i64 = 9_007_199_254_740_991;

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Converts a wire amount (JSON number in major units) to minor units,
    /// rounding half away from zero.
    #[must_use]
    pub fn from_major(value: f64, decimals: u8) -> Self {
        Self((value * scale(decimals) as f64).round() as i64)
    }

    /// Converts back to major units for the wire.
    #[must_use]
    pub fn to_major(self, decimals: u8) -> f64 {
        self.0 as f64 / scale(decimals) as f64
    }

    /// Formats the amount in major units with `decimals` fraction digits.
    ///
    /// With `grouped` the integer part gets `,` thousands separators.
    #[must_use]
    pub fn format_major(self, decimals: u8, grouped: bool) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = scale(decimals).unsigned_abs();
        let major = abs / scale;
        let minor = abs % scale;

        let mut integer = major.to_string();
        if grouped {
            integer = group_thousands(&integer);
        }

        if decimals == 0 {
            format!("{sign}{integer}")
        } else {
            format!(
                "{sign}{integer}.{minor:0width$}",
                width = usize::from(decimals)
            )
        }
    }

    /// Parses a decimal string in major units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - at most `decimals` fractional digits (rejects `12.345` for 2)
    /// - rejects empty/invalid strings
    pub fn parse_major(s: &str, decimals: u8) -> Result<Self, EngineError> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {}", s.trim()));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped.trim())
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped.trim())
        } else {
            (false, trimmed)
        };
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let major_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next().unwrap_or("");
        if parts.next().is_some() {
            return Err(invalid());
        }

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac_str.len() > usize::from(decimals) {
            return Err(EngineError::InvalidAmount(format!(
                "too many decimals (max {decimals})"
            )));
        }

        let major: i64 = major_str.parse().map_err(|_| overflow())?;
        let padded = format!("{frac_str:0<width$}", width = usize::from(decimals));
        let minor: i64 = if padded.is_empty() {
            0
        } else {
            padded.parse().map_err(|_| invalid())?
        };

        let total = major
            .checked_mul(scale(decimals))
            .and_then(|v| v.checked_add(minor))
            .filter(|v| *v <= Self::MAX_MINOR)
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }

    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Re-expresses the amount in a currency with `to` fraction digits.
    ///
    /// Dropped digits are rounded half away from zero.
    #[must_use]
    pub fn rescale(self, from: u8, to: u8) -> Self {
        if to >= from {
            return Money(self.0.saturating_mul(scale(to - from)));
        }
        let divisor = scale(from - to);
        let quotient = self.0 / divisor;
        let remainder = self.0 % divisor;
        let round = if remainder.unsigned_abs() * 2 >= divisor.unsigned_abs() {
            self.0.signum()
        } else {
            0
        };
        Money(quotient + round)
    }
}

fn scale(decimals: u8) -> i64 {
    10_i64.saturating_pow(u32::from(decimals))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}
