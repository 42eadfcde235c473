//! # Tax Policy
//!
//! Tax is charged on the taxable base (total minus discount), exclusive of
//! the item prices. The base is used exactly as given: a negative base
//! yields a negative tax amount.

use crate::money::Money;
use crate::types::Tax;

/// Computes the tax amount for `taxable_base`.
///
/// Returns zero when there is no tax or the tax is inactive, otherwise
/// `taxable_base × rate / 100`.
pub fn apply_tax(tax: Option<&Tax>, taxable_base: Money) -> Money {
    match tax {
        Some(t) if t.is_active => taxable_base.percentage(t.rate),
        _ => Money::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn tax(rate: Decimal, is_active: bool) -> Tax {
        Tax {
            id: "t1".to_string(),
            name: "VAT".to_string(),
            rate,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_tax() {
        assert_eq!(apply_tax(None, Money::new(dec!(90))), Money::zero());
    }

    #[test]
    fn test_inactive_tax_is_zero() {
        let t = tax(dec!(20), false);
        assert_eq!(apply_tax(Some(&t), Money::new(dec!(90))), Money::zero());
    }

    #[test]
    fn test_tax_on_base() {
        let t = tax(dec!(20), true);
        assert_eq!(
            apply_tax(Some(&t), Money::new(dec!(90.00))),
            Money::new(dec!(18.00))
        );
    }

    #[test]
    fn test_fractional_rate() {
        let t = tax(dec!(8.25), true);
        assert_eq!(apply_tax(Some(&t), Money::new(dec!(10.00))).amount(), dec!(0.825));
    }

    #[test]
    fn test_negative_base_is_not_clamped() {
        let t = tax(dec!(20), true);
        assert_eq!(
            apply_tax(Some(&t), Money::new(dec!(-10.00))),
            Money::new(dec!(-2.00))
        );
    }
}
