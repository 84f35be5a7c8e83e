//! Money Module
//!
//! Exact-precision monetary values. All balances and transfer amounts in the
//! crate are `Money`; there is no floating-point path anywhere.
//!
//! ## Design Principles
//! 1. Decimal only: values are `rust_decimal::Decimal`, never `f64`
//! 2. Explicit Error Handling: malformed input is rejected, never "fixed up"
//! 3. No silent truncation: more fractional digits than the scale is an error
//! 4. Pure value: subtraction may go negative, domain rules live in callers
//!
//! ## Canonical Form
//! Every value is rescaled to the configured scale (minor unit of the
//! currency, 2 by default) so the canonical string always carries exactly
//! `scale` fractional digits.
//!
//! ## Usage
//! ```rust
//! use internal_transfer::money::{Money, DEFAULT_SCALE};
//!
//! let balance = Money::parse("1000", DEFAULT_SCALE).unwrap();
//! let amount = Money::parse_positive("100.5", DEFAULT_SCALE).unwrap();
//! let left = balance.checked_sub(amount).unwrap();
//! assert_eq!(left.to_string(), "899.50");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Default number of fractional digits (cents)
pub const DEFAULT_SCALE: u32 = 2;

/// Largest scale `rust_decimal` can represent
pub const MAX_SCALE: u32 = 28;

// ============================================================================
// Error Types
// ============================================================================

/// Money parsing / validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("amount cannot be empty")]
    Empty,

    #[error("amount cannot be negative")]
    Negative,

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("amount is too large")]
    Overflow,

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unsupported scale {0} (max {MAX_SCALE})")]
    UnsupportedScale(u32),
}

// ============================================================================
// Money
// ============================================================================

/// Exact decimal monetary value with a fixed scale.
///
/// Equality and ordering are numeric, so `1.0` and `1.00` compare equal even
/// if they were built with different scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Zero at the given scale (`"0.00"` for scale 2)
    pub fn zero(scale: u32) -> Self {
        Self(Decimal::new(0, scale.min(MAX_SCALE)))
    }

    /// Parse a client/string amount. Zero is allowed, negatives are not.
    ///
    /// # Errors
    /// * `Empty` / `InvalidFormat` - malformed text
    /// * `Negative` - leading minus sign
    /// * `PrecisionOverflow` - more fractional digits than `scale`
    /// * `Overflow` - value outside the decimal range
    pub fn parse(input: &str, scale: u32) -> Result<Self, MoneyError> {
        if scale > MAX_SCALE {
            return Err(MoneyError::UnsupportedScale(scale));
        }

        let s = input.trim();
        if s.is_empty() {
            return Err(MoneyError::Empty);
        }
        if s.starts_with('-') {
            return Err(MoneyError::Negative);
        }
        if s.starts_with('+') {
            return Err(MoneyError::InvalidFormat("+ prefix not allowed".into()));
        }

        let (whole, frac) = match s.split_once('.') {
            None => (s, ""),
            Some((whole, frac)) => {
                // Require both sides of the dot: "0.5" not ".5", "5.0" not "5."
                if whole.is_empty() {
                    return Err(MoneyError::InvalidFormat("use 0.5 not .5".into()));
                }
                if frac.is_empty() {
                    return Err(MoneyError::InvalidFormat("use 5.0 not 5.".into()));
                }
                if frac.contains('.') {
                    return Err(MoneyError::InvalidFormat("multiple decimal points".into()));
                }
                (whole, frac)
            }
        };

        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(MoneyError::InvalidFormat(format!(
                "only digits and one '.' are allowed: {s}"
            )));
        }

        let provided = frac.len() as u32;
        if provided > scale {
            return Err(MoneyError::PrecisionOverflow {
                provided,
                max: scale,
            });
        }

        let value = Decimal::from_str(s).map_err(|_| MoneyError::Overflow)?;
        Self::at_scale(value, scale)
    }

    /// Parse a transfer amount: same rules as [`Money::parse`] plus `> 0`.
    pub fn parse_positive(input: &str, scale: u32) -> Result<Self, MoneyError> {
        let value = Self::parse(input, scale)?;
        if value.is_zero() {
            return Err(MoneyError::NotPositive);
        }
        Ok(value)
    }

    /// Re-validate a decimal loaded from storage.
    ///
    /// Rejects negatives and values with more precision than `scale` instead
    /// of rounding them.
    pub fn from_decimal(value: Decimal, scale: u32) -> Result<Self, MoneyError> {
        if scale > MAX_SCALE {
            return Err(MoneyError::UnsupportedScale(scale));
        }
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MoneyError::Negative);
        }
        let normalized = value.normalize();
        if normalized.scale() > scale {
            return Err(MoneyError::PrecisionOverflow {
                provided: normalized.scale(),
                max: scale,
            });
        }
        Self::at_scale(normalized, scale)
    }

    /// Pad to `scale` digits. `rescale` stops early when the mantissa has no
    /// room left, which would leave a non-canonical value.
    fn at_scale(mut value: Decimal, scale: u32) -> Result<Self, MoneyError> {
        value.rescale(scale);
        if value.scale() != scale {
            return Err(MoneyError::Overflow);
        }
        Ok(Self(value))
    }

    /// `self + other`, `None` on overflow
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.exact(other, self.0.checked_add(other.0))
    }

    /// `self - other`, `None` on overflow. The result may be negative.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.exact(other, self.0.checked_sub(other.0))
    }

    /// `Decimal` drops fractional digits instead of failing once the mantissa
    /// is full; a result that lost scale is an overflow.
    fn exact(self, other: Money, result: Option<Decimal>) -> Option<Money> {
        let result = result?;
        (result.scale() == self.scale().max(other.scale())).then_some(Money(result))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Number of fractional digits carried by this value
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// Underlying decimal (for binding to NUMERIC columns)
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Exact string with `scale` fractional digits, e.g. `"900.00"`
    pub fn to_canonical_string(&self) -> String {
        self.0.to_string()
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Always a JSON string, a JSON number would go through f64 on many clients
        serializer.serialize_str(&self.to_canonical_string())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> Money {
        Money::parse(s, DEFAULT_SCALE).unwrap()
    }

    #[test]
    fn test_parse_pads_to_scale() {
        assert_eq!(m("1000").to_string(), "1000.00");
        assert_eq!(m("1000.5").to_string(), "1000.50");
        assert_eq!(m("0.01").to_string(), "0.01");
        assert_eq!(m("  42.10 ").to_string(), "42.10");
    }

    #[test]
    fn test_parse_allows_zero_but_positive_does_not() {
        assert!(m("0").is_zero());
        assert_eq!(
            Money::parse_positive("0.00", DEFAULT_SCALE),
            Err(MoneyError::NotPositive)
        );
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(Money::parse("-1.00", 2), Err(MoneyError::Negative));
        assert_eq!(Money::parse_positive("-0.01", 2), Err(MoneyError::Negative));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [".5", "5.", "1.2.3", "1e3", "1E3", "+5", "abc", "1,000.00", "0x10", "NaN"] {
            let result = Money::parse(bad, DEFAULT_SCALE);
            assert!(
                matches!(result, Err(MoneyError::InvalidFormat(_))),
                "{bad:?} should be rejected as malformed, got {result:?}"
            );
        }
        assert_eq!(Money::parse("", 2), Err(MoneyError::Empty));
        assert_eq!(Money::parse("   ", 2), Err(MoneyError::Empty));
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert_eq!(
            Money::parse("1.005", 2),
            Err(MoneyError::PrecisionOverflow {
                provided: 3,
                max: 2
            })
        );
        // Same digits are fine at a wider scale
        assert_eq!(Money::parse("1.005", 3).unwrap().to_string(), "1.005");
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let huge = "9".repeat(40);
        assert_eq!(Money::parse(&huge, 2), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_parse_rejects_values_without_room_for_scale() {
        // 28 digits fit a Decimal but leave no room for two fractional digits
        let wide = "9".repeat(28);
        assert_eq!(Money::parse(&wide, 2), Err(MoneyError::Overflow));
        assert_eq!(
            Money::from_decimal(Decimal::from_str(&wide).unwrap(), 2),
            Err(MoneyError::Overflow)
        );

        let max = Money::parse("792281625142643375935439503.35", 2).unwrap();
        assert_eq!(max.to_string(), "792281625142643375935439503.35");
        assert_eq!(max.scale(), 2);
    }

    #[test]
    fn test_parse_rejects_unsupported_scale() {
        assert_eq!(Money::parse("1", 29), Err(MoneyError::UnsupportedScale(29)));
    }

    #[test]
    fn test_arithmetic_is_exact() {
        // 0.1 + 0.2 is the classic binary float failure
        let sum = m("0.10").checked_add(m("0.20")).unwrap();
        assert_eq!(sum, m("0.30"));
        assert_eq!(sum.to_string(), "0.30");

        let mut acc = Money::zero(2);
        for _ in 0..1000 {
            acc = acc.checked_add(m("0.01")).unwrap();
        }
        assert_eq!(acc.to_string(), "10.00");
    }

    #[test]
    fn test_arithmetic_never_rounds_at_the_limit() {
        let max = m("792281625142643375935439503.35");
        assert_eq!(max.checked_add(m("0.01")), None);
        assert_eq!(max.checked_add(m("1")), None);
        assert_eq!(
            max.checked_sub(m("0.01")).unwrap().to_string(),
            "792281625142643375935439503.34"
        );
        assert_eq!(
            m("0").checked_sub(max).unwrap().to_string(),
            "-792281625142643375935439503.35"
        );
        assert_eq!(max.checked_sub(max).unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_sub_may_go_negative() {
        let diff = m("900.00").checked_sub(m("10000.00")).unwrap();
        assert!(diff.is_negative());
        assert_eq!(diff.to_string(), "-9100.00");
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(m("99.99") < m("100"));
        assert!(m("100.00") >= m("100"));
        assert_eq!(Money::parse("1", 2).unwrap(), Money::parse("1", 4).unwrap());
    }

    #[test]
    fn test_from_decimal_validates_stored_values() {
        let ok = Money::from_decimal(Decimal::new(150, 1), 2).unwrap();
        assert_eq!(ok.to_string(), "15.00");

        // Trailing zeros beyond the scale are not real precision
        let padded = Money::from_decimal(Decimal::new(150_000, 4), 2).unwrap();
        assert_eq!(padded.to_string(), "15.00");

        assert_eq!(
            Money::from_decimal(Decimal::new(-1, 0), 2),
            Err(MoneyError::Negative)
        );
        assert!(matches!(
            Money::from_decimal(Decimal::new(1_005, 3), 2),
            Err(MoneyError::PrecisionOverflow { .. })
        ));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&m("12.3")).unwrap();
        assert_eq!(json, r#""12.30""#);
    }
}
