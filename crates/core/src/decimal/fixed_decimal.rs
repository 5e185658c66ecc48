//! Exact decimal value type used for amounts, rates and fees.
//!
//! A value is a signed mantissa and a non-negative scale:
//! `value = mantissa / 10^scale`. It is backed by `rust_decimal::Decimal`,
//! which stores exactly that pair, so nothing here ever touches binary
//! floating point.
//!
//! Division rounding rule: the exact quotient is rounded half-to-even
//! (banker's rounding) to `max(lhs.scale, rhs.scale, min_scale)` digits,
//! capped at [`MAX_SCALE`]. `min_scale` is [`DIVISION_MIN_SCALE`] unless the caller
//! passes one through [`FixedPointDecimal::div_with_scale`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use super::decimal_errors::DecimalError;
use crate::constants::{DIVISION_MIN_SCALE, MAX_SCALE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FixedPointDecimal(Decimal);

impl FixedPointDecimal {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    /// Builds a value from its raw parts. Fails when `scale` exceeds
    /// [`MAX_SCALE`] or the mantissa does not fit in 96 bits.
    pub fn from_parts(mantissa: i128, scale: u32) -> Result<Self, DecimalError> {
        Decimal::try_from_i128_with_scale(mantissa, scale)
            .map(Self)
            .map_err(|e| DecimalError::Overflow(e.to_string()))
    }

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn mantissa(&self) -> i128 {
        self.0.mantissa()
    }

    #[inline]
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// True iff the mantissa is zero, whatever the scale. This is the
    /// "no value provided" test.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mantissa() == 0
    }

    #[inline]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Numeric three-way comparison; `1.2` and `1.20` compare equal.
    #[inline]
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// Returns the value re-expressed with exactly `scale` digits, rounding
    /// half-to-even when digits are dropped.
    pub fn rescale(&self, scale: u32) -> Self {
        let scale = scale.min(MAX_SCALE);
        let mut value = self
            .0
            .round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);
        value.rescale(scale);
        Self(value)
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, DecimalError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| DecimalError::Overflow(format!("{} + {}", self, rhs)))
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, DecimalError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or_else(|| DecimalError::Overflow(format!("{} - {}", self, rhs)))
    }

    pub fn checked_mul(self, rhs: Self) -> Result<Self, DecimalError> {
        self.0
            .checked_mul(rhs.0)
            .map(Self)
            .ok_or_else(|| DecimalError::Overflow(format!("{} * {}", self, rhs)))
    }

    /// Divides using the default minimum output scale.
    pub fn checked_div(self, rhs: Self) -> Result<Self, DecimalError> {
        self.div_with_scale(rhs, DIVISION_MIN_SCALE)
    }

    /// Divides and rounds half-to-even to
    /// `max(self.scale, rhs.scale, min_scale)` digits.
    ///
    /// The quotient is computed on the integer mantissas with its remainder,
    /// so the rounding sees the exact value. Only when the scaled numerator
    /// no longer fits in an `i128` does it go through `Decimal` division,
    /// which first rounds to 28 significant digits.
    pub fn div_with_scale(self, rhs: Self, min_scale: u32) -> Result<Self, DecimalError> {
        if rhs.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }

        let scale = self.scale().max(rhs.scale()).max(min_scale).min(MAX_SCALE);
        match exact_quotient(self, rhs, scale) {
            Some(mantissa) => Self::from_parts(mantissa, scale),
            None => {
                let quotient = self
                    .0
                    .checked_div(rhs.0)
                    .ok_or_else(|| DecimalError::Overflow(format!("{} / {}", self, rhs)))?;
                Ok(Self(quotient).rescale(scale))
            }
        }
    }
}

/// Mantissa of `lhs / rhs` at `scale`, rounded half-to-even.
/// `None` when the scaled numerator overflows.
fn exact_quotient(lhs: FixedPointDecimal, rhs: FixedPointDecimal, scale: u32) -> Option<i128> {
    // lhs / rhs * 10^scale == lhs.m * 10^(scale + rhs.s - lhs.s) / rhs.m
    let shift = (scale + rhs.scale()).checked_sub(lhs.scale())?;
    let numerator = 10i128
        .checked_pow(shift)
        .and_then(|p| lhs.mantissa().checked_mul(p))?;
    let denominator = rhs.mantissa();

    let quotient = numerator / denominator;
    let remainder = (numerator % denominator).unsigned_abs();
    let twice = remainder.checked_mul(2)?;
    let round_away = match twice.cmp(&denominator.unsigned_abs()) {
        Ordering::Greater => true,
        Ordering::Equal => quotient % 2 != 0,
        Ordering::Less => false,
    };
    if !round_away {
        return Some(quotient);
    }
    if (numerator < 0) != (denominator < 0) {
        quotient.checked_sub(1)
    } else {
        quotient.checked_add(1)
    }
}

impl fmt::Display for FixedPointDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses user input. Surrounding whitespace is ignored and a comma is
/// accepted as the decimal separator.
impl FromStr for FixedPointDecimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DecimalError::Parse {
                input: s.to_string(),
                reason: "empty input".to_string(),
            });
        }

        let normalized = trimmed.replace(',', ".");
        Decimal::from_str(&normalized)
            .map(Self)
            .map_err(|e| DecimalError::Parse {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl TryFrom<String> for FixedPointDecimal {
    type Error = DecimalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FixedPointDecimal> for String {
    fn from(value: FixedPointDecimal) -> Self {
        value.to_string()
    }
}

impl From<Decimal> for FixedPointDecimal {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl From<i64> for FixedPointDecimal {
    fn from(v: i64) -> Self {
        Self(Decimal::from(v))
    }
}

impl PartialOrd for FixedPointDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedPointDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other)
    }
}

impl Add for FixedPointDecimal {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for FixedPointDecimal {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul for FixedPointDecimal {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

/// Panics on a zero divisor. Use [`FixedPointDecimal::checked_div`] when the
/// divisor comes from user input.
impl Div for FixedPointDecimal {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        match self.checked_div(rhs) {
            Ok(value) => value,
            Err(e) => panic!("fixed-point division failed: {}", e),
        }
    }
}

impl Neg for FixedPointDecimal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}
