//! Money math shared by cart and checkout totals.
//!
//! All amounts are USD [`Decimal`] values in the currency's standard unit
//! (dollars, not cents). The shipping and tax rules here are the store's
//! fixed policy: flat-rate shipping waived at the free-shipping threshold,
//! and a flat tax rate applied to the subtotal only (never to shipping).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Subtotal at or above which shipping is free ($50.00).
#[must_use]
pub fn free_shipping_threshold() -> Decimal {
    Decimal::new(5000, 2)
}

/// Flat shipping charge below the free-shipping threshold ($9.99).
#[must_use]
pub fn flat_shipping_rate() -> Decimal {
    Decimal::new(999, 2)
}

/// Flat tax rate applied to the subtotal (8%).
#[must_use]
pub fn tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// Computed order totals.
///
/// Always derived from a subtotal via [`Totals::from_subtotal`]; callers
/// never supply shipping/tax/total figures of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Compute shipping, tax, and grand total from a subtotal.
    ///
    /// Shipping is zero for an empty (zero-subtotal) cart and above the
    /// free-shipping threshold. Tax is rounded to whole cents.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let shipping = if subtotal.is_zero() || subtotal >= free_shipping_threshold() {
            Decimal::ZERO
        } else {
            flat_shipping_rate()
        };
        let tax = (subtotal * tax_rate()).round_dp(2);

        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// Format an amount for display, e.g. `$19.99`.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    format!("${amount:.2}")
}

/// Percentage discount of `price` against `original`, rounded to the
/// nearest whole percent. Returns 0 unless `original > price`.
#[must_use]
pub fn discount_percent(original: Decimal, price: Decimal) -> u32 {
    if original <= price || original.is_zero() {
        return 0;
    }

    ((original - price) * Decimal::ONE_HUNDRED / original)
        .round()
        .to_u32()
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_totals_below_threshold() {
        let totals = Totals::from_subtotal(dec("40.00"));
        assert_eq!(totals.shipping, dec("9.99"));
        assert_eq!(totals.tax, dec("3.20"));
        assert_eq!(totals.total, dec("53.19"));
    }

    #[test]
    fn test_totals_at_threshold_ships_free() {
        let totals = Totals::from_subtotal(dec("50.00"));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.tax, dec("4.00"));
        assert_eq!(totals.total, dec("54.00"));
    }

    #[test]
    fn test_totals_above_threshold() {
        let totals = Totals::from_subtotal(dec("60.00"));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.tax, dec("4.80"));
        assert_eq!(totals.total, dec("64.80"));
    }

    #[test]
    fn test_totals_zero_subtotal_has_no_shipping() {
        let totals = Totals::from_subtotal(Decimal::ZERO);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        // 8% of $10.55 is $0.844
        let totals = Totals::from_subtotal(dec("10.55"));
        assert_eq!(totals.tax, dec("0.84"));
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(dec("79.99")), "$79.99");
        assert_eq!(format_usd(dec("5")), "$5.00");
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(discount_percent(dec("99.99"), dec("79.99")), 20);
        assert_eq!(discount_percent(dec("100"), dec("100")), 0);
        assert_eq!(discount_percent(dec("79.99"), dec("99.99")), 0);
    }
}
