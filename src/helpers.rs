//! Shared rounding and Decimal ↔ f64 conversion helpers.
//!
//! Prices live in the database as `Decimal` and flow through the scoring and
//! projection code as `f64`. Two rounding precisions are used:
//!
//! - `round1`: impact scores and multipliers (one decimal place)
//! - `round2`: money values (two decimal places)
//!
//! Decimal conversions return zero for values that can't be represented.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Round an f64 to one decimal place.
pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Round an f64 to two decimal places.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Convert a Decimal to f64, defaulting to 0.0 for values that can't be
/// represented.
pub(crate) fn dec_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Convert an f64 price to Decimal, rounded to two decimal places.
///
/// Non-finite inputs (NaN, ±Inf) become zero rather than poisoning a row.
pub(crate) fn f64_to_decimal_2dp(v: f64) -> Decimal {
    if !v.is_finite() {
        tracing::warn!(
            "f64_to_decimal_2dp received non-finite value {}, defaulting to 0",
            v
        );
        return Decimal::ZERO;
    }
    Decimal::from_f64(round2(v)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round1() {
        assert_eq!(round1(3.14), 3.1);
        assert_eq!(round1(3.16), 3.2);
    }

    #[test]
    fn test_round1_negative() {
        assert_eq!(round1(-9.94), -9.9);
        assert_eq!(round1(-9.96), -10.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1999.999), 2000.0);
        assert_eq!(round2(2150.456), 2150.46);
    }

    #[test]
    fn test_dec_to_f64() {
        let d = Decimal::from_str("2150.50").unwrap();
        assert!((dec_to_f64(d) - 2150.5).abs() < 1e-9);
        assert_eq!(dec_to_f64(Decimal::ZERO), 0.0);
    }

    #[test]
    fn test_f64_to_decimal_2dp() {
        assert_eq!(
            f64_to_decimal_2dp(2150.456),
            Decimal::from_str("2150.46").unwrap()
        );
        assert_eq!(f64_to_decimal_2dp(f64::NAN), Decimal::ZERO);
        assert_eq!(f64_to_decimal_2dp(f64::INFINITY), Decimal::ZERO);
    }
}
