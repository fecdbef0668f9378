//! # Micros Module
//!
//! The ad platform expresses every bid and budget in micros of the account
//! currency: one unit is 1 000 000 micros.
//!
//! ## Conversion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator enters: 1.25  (currency units, from a form or API call)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Micros::from_units(1.25) ← rejects NaN, infinity, zero, negatives     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  round(1.25 × 1 000 000) = 1 250 000 micros → sent to the platform     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Units only exist at the edge; everything stored or sent is integer micros.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::MICROS_PER_UNIT;

// =============================================================================
// Micros Type
// =============================================================================

/// An amount in platform micros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Micros(i64);

impl Micros {
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Micros(micros)
    }

    /// Converts a positive currency amount to micros, rounding to the nearest
    /// micro.
    ///
    /// Returns `None` for values that are not finite, not strictly positive,
    /// or too large to represent.
    ///
    /// ## Example
    /// ```rust
    /// use adlaunch_core::micros::Micros;
    ///
    /// assert_eq!(Micros::from_units(0.5).map(|m| m.value()), Some(500_000));
    /// assert_eq!(Micros::from_units(0.0), None);
    /// assert_eq!(Micros::from_units(f64::NAN), None);
    /// ```
    pub fn from_units(units: f64) -> Option<Self> {
        if !units.is_finite() || units <= 0.0 {
            return None;
        }

        let scaled = (units * MICROS_PER_UNIT as f64).round();
        if scaled < 1.0 || scaled >= i64::MAX as f64 {
            return None;
        }

        Some(Micros(scaled as i64))
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// The amount in currency units (display only).
    #[inline]
    pub fn units(&self) -> f64 {
        self.0 as f64 / MICROS_PER_UNIT as f64
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Micros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_unit = MICROS_PER_UNIT as u64;
        write!(f, "{}{}.{:06}", sign, abs / per_unit, abs % per_unit)
    }
}

impl From<Micros> for i64 {
    fn from(value: Micros) -> Self {
        value.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units_rounds_to_nearest_micro() {
        assert_eq!(Micros::from_units(1.25).unwrap().value(), 1_250_000);
        assert_eq!(Micros::from_units(0.1234567).unwrap().value(), 123_457);
        assert_eq!(Micros::from_units(2.0).unwrap().value(), 2_000_000);
    }

    #[test]
    fn test_from_units_rejects_non_positive_and_non_finite() {
        assert!(Micros::from_units(0.0).is_none());
        assert!(Micros::from_units(-1.0).is_none());
        assert!(Micros::from_units(f64::INFINITY).is_none());
        assert!(Micros::from_units(f64::NAN).is_none());
        assert!(Micros::from_units(1e30).is_none());
    }

    #[test]
    fn test_sub_micro_amount_rejected() {
        // rounds to zero micros
        assert!(Micros::from_units(0.0000001).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Micros::from_micros(1_250_000).to_string(), "1.250000");
        assert_eq!(Micros::from_micros(-500).to_string(), "-0.000500");
    }
}
