//! Peso prices for fixed-price clinic add-ons.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in Philippine pesos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    amount: Decimal,
}

impl Price {
    /// Create a price from a whole number of pesos.
    #[must_use]
    pub fn pesos(whole: i64) -> Self {
        Self {
            amount: Decimal::from(whole),
        }
    }

    /// Get the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }
}

impl std::fmt::Display for Price {
    /// Formats as `₱1,200` (or `₱1,200.50` when there are centavos).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rounded = self.amount.round_dp(2);
        let whole = rounded.trunc();
        let digits = whole.abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let fraction = (rounded - whole).abs();
        if fraction.is_zero() {
            write!(f, "{sign}₱{grouped}")
        } else {
            let cents = (fraction * Decimal::from(100)).trunc().to_string();
            write!(f, "{sign}₱{grouped}.{cents:0>2}")
        }
    }
}
