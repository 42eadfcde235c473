//! # Checkout Request
//!
//! The typed hand-off from a priced order to the payment adapter.
//!
//! ```text
//! ┌──────────────────────┐   CheckoutRequest::for_order   ┌─────────────────────┐
//! │    OrderSnapshot     │ ─────────────────────────────► │   CheckoutRequest   │
//! │  order (pending)     │   pending?       else reject   │  line_items (minor) │
//! │  lines (snapshots)   │   one currency?  else reject   │  coupon?            │
//! │  discount?, tax?     │   minor units fit i64?         │  tax_rate?          │
//! └──────────────────────┘                                │  amount (final)     │
//!                                                         └─────────────────────┘
//! ```
//!
//! Nothing provider-specific lives here. The adapter turns this structure
//! into whatever its wire format needs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::order_currency;
use crate::types::{Currency, Discount, DiscountKind, OrderLine, OrderSnapshot, Tax};

/// One line of the provider checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLineItem {
    pub currency: Currency,
    pub name: String,
    pub description: String,
    /// Unit price in minor units, truncated toward zero.
    pub unit_amount: i64,
    pub quantity: i64,
}

impl ProviderLineItem {
    pub fn from_line(line: &OrderLine) -> CoreResult<Self> {
        Ok(ProviderLineItem {
            currency: line.currency,
            name: line.name_snapshot.clone(),
            description: line.description_snapshot.clone(),
            unit_amount: line.unit_price.to_minor_units()?,
            quantity: line.quantity,
        })
    }
}

/// Coupon derived from the order's discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CouponSpec {
    PercentOff {
        name: String,
        percent: Decimal,
    },
    AmountOff {
        name: String,
        /// Minor units.
        amount: i64,
        currency: Currency,
    },
}

impl CouponSpec {
    /// Coupon reproducing the `discount_amount` frozen on the order.
    ///
    /// `None` when nothing was discounted. The live `is_active` flag is not
    /// consulted: toggling a discount never reprices an existing order.
    pub fn from_discount(
        discount: &Discount,
        frozen_amount: Money,
        currency: Currency,
    ) -> CoreResult<Option<Self>> {
        if frozen_amount.is_zero() {
            return Ok(None);
        }

        let spec = match discount.kind {
            DiscountKind::Percentage => CouponSpec::PercentOff {
                name: discount.name.clone(),
                percent: discount.value,
            },
            DiscountKind::Fixed => CouponSpec::AmountOff {
                name: discount.name.clone(),
                amount: frozen_amount.to_minor_units()?,
                currency,
            },
        };
        Ok(Some(spec))
    }
}

/// Exclusive tax rate derived from the order's tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRateSpec {
    pub display_name: String,
    pub percentage: Decimal,
    /// Always `false`: tax is charged on top of the discounted total.
    pub inclusive: bool,
    pub description: String,
}

impl TaxRateSpec {
    /// `None` when the order froze no tax.
    pub fn from_tax(tax: &Tax, frozen_amount: Money) -> Option<Self> {
        (!frozen_amount.is_zero()).then(|| TaxRateSpec {
            display_name: tax.name.clone(),
            percentage: tax.rate,
            inclusive: false,
            description: format!("Tax rate for {}", tax.name),
        })
    }
}

/// Everything the payment adapter needs for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: String,
    pub currency: Currency,
    pub line_items: Vec<ProviderLineItem>,
    pub coupon: Option<CouponSpec>,
    pub tax_rate: Option<TaxRateSpec>,
    /// `final_amount` in minor units, truncated toward zero.
    pub amount: i64,
}

impl CheckoutRequest {
    /// Builds the request for a pending, single-currency order.
    ///
    /// ## Errors
    /// - [`CoreError::InvalidOrderStatus`] if the order is paid or cancelled
    /// - [`CoreError::MixedCurrency`] / [`CoreError::EmptyOrder`] from the
    ///   currency check
    /// - [`CoreError::AmountOutOfRange`] if an amount does not fit minor units
    pub fn for_order(snapshot: &OrderSnapshot) -> CoreResult<Self> {
        let order = &snapshot.order;
        order.ensure_pending()?;

        let currency = order_currency(&snapshot.lines)?;
        if currency != order.currency {
            return Err(CoreError::MixedCurrency {
                currencies: vec![order.currency.code().to_string(), currency.code().to_string()],
            });
        }

        let line_items = snapshot
            .lines
            .iter()
            .map(ProviderLineItem::from_line)
            .collect::<CoreResult<Vec<_>>>()?;

        // Coupon and rate follow the amounts priced at creation.
        let coupon = match (&order.discount_id, &snapshot.discount) {
            (Some(_), Some(d)) => CouponSpec::from_discount(d, order.discount_amount, currency)?,
            _ => None,
        };
        let tax_rate = match (&order.tax_id, &snapshot.tax) {
            (Some(_), Some(t)) => TaxRateSpec::from_tax(t, order.tax_amount),
            _ => None,
        };

        Ok(CheckoutRequest {
            order_id: order.id.clone(),
            currency,
            line_items,
            coupon,
            tax_rate,
            amount: order.final_amount.to_minor_units()?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Item, Order};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn item(price: Decimal, currency: Currency) -> Item {
        Item {
            id: "item-1".to_string(),
            name: "Candle".to_string(),
            description: "Soy wax".to_string(),
            price: Money::new(price),
            currency,
            created_at: Utc::now(),
        }
    }

    fn discount(kind: DiscountKind, value: Decimal) -> Discount {
        Discount {
            id: "d1".to_string(),
            name: "Launch".to_string(),
            kind,
            value,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn tax() -> Tax {
        Tax {
            id: "t1".to_string(),
            name: "VAT".to_string(),
            rate: dec!(20.00),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn snapshot(lines: Vec<OrderLine>, discount: Option<Discount>, tax: Option<Tax>) -> OrderSnapshot {
        let order =
            Order::create("order-1", &lines, discount.as_ref(), tax.as_ref(), Utc::now()).unwrap();
        OrderSnapshot {
            order,
            lines,
            discount,
            tax,
        }
    }

    #[test]
    fn test_request_for_pending_order() {
        let candle = item(dec!(19.995), Currency::Usd);
        let lines = vec![OrderLine::from_item("l1", "order-1", &candle, 2, Utc::now())];
        let snap = snapshot(lines, None, None);

        let req = CheckoutRequest::for_order(&snap).unwrap();

        assert_eq!(req.order_id, "order-1");
        assert_eq!(req.currency, Currency::Usd);
        assert_eq!(req.line_items.len(), 1);
        assert_eq!(req.line_items[0].unit_amount, 1999);
        assert_eq!(req.line_items[0].quantity, 2);
        assert_eq!(req.line_items[0].name, "Candle");
        assert_eq!(req.line_items[0].description, "Soy wax");
        // 39.99 exactly
        assert_eq!(req.amount, 3999);
        assert!(req.coupon.is_none());
        assert!(req.tax_rate.is_none());
    }

    #[test]
    fn test_percentage_discount_becomes_percent_off_coupon() {
        let candle = item(dec!(100.00), Currency::Rub);
        let lines = vec![OrderLine::from_item("l1", "order-1", &candle, 1, Utc::now())];
        let snap = snapshot(
            lines,
            Some(discount(DiscountKind::Percentage, dec!(10))),
            Some(tax()),
        );

        let req = CheckoutRequest::for_order(&snap).unwrap();

        assert_eq!(
            req.coupon,
            Some(CouponSpec::PercentOff {
                name: "Launch".to_string(),
                percent: dec!(10),
            })
        );
        let rate = req.tax_rate.unwrap();
        assert_eq!(rate.percentage, dec!(20));
        assert!(!rate.inclusive);
        assert_eq!(rate.description, "Tax rate for VAT");
        assert_eq!(req.amount, 10800);
    }

    #[test]
    fn test_fixed_discount_becomes_amount_off_coupon() {
        let candle = item(dec!(100.00), Currency::Eur);
        let lines = vec![OrderLine::from_item("l1", "order-1", &candle, 1, Utc::now())];
        let snap = snapshot(lines, Some(discount(DiscountKind::Fixed, dec!(5.50))), None);

        let req = CheckoutRequest::for_order(&snap).unwrap();

        assert_eq!(
            req.coupon,
            Some(CouponSpec::AmountOff {
                name: "Launch".to_string(),
                amount: 550,
                currency: Currency::Eur,
            })
        );
    }

    #[test]
    fn test_inactive_discount_and_tax_are_omitted() {
        let candle = item(dec!(10.00), Currency::Usd);
        let lines = vec![OrderLine::from_item("l1", "order-1", &candle, 1, Utc::now())];
        let mut d = discount(DiscountKind::Percentage, dec!(10));
        let mut t = tax();
        d.is_active = false;
        t.is_active = false;

        let req = CheckoutRequest::for_order(&snapshot(lines, Some(d), Some(t))).unwrap();

        assert!(req.coupon.is_none());
        assert!(req.tax_rate.is_none());
    }

    #[test]
    fn test_deactivation_after_creation_keeps_coupon_and_rate() {
        let candle = item(dec!(100.00), Currency::Rub);
        let lines = vec![OrderLine::from_item("l1", "order-1", &candle, 1, Utc::now())];
        let mut snap = snapshot(
            lines,
            Some(discount(DiscountKind::Percentage, dec!(10))),
            Some(tax()),
        );
        assert_eq!(snap.order.discount_amount, Money::new(dec!(10.00)));

        // Admin toggles both off before the checkout retry.
        snap.discount.as_mut().unwrap().is_active = false;
        snap.tax.as_mut().unwrap().is_active = false;

        let req = CheckoutRequest::for_order(&snap).unwrap();

        assert_eq!(
            req.coupon,
            Some(CouponSpec::PercentOff {
                name: "Launch".to_string(),
                percent: dec!(10),
            })
        );
        assert_eq!(req.tax_rate.unwrap().percentage, dec!(20));
        assert_eq!(req.amount, snap.order.final_amount.to_minor_units().unwrap());
        assert_eq!(req.amount, 10800);
    }

    #[test]
    fn test_activation_after_creation_adds_nothing() {
        let candle = item(dec!(50.00), Currency::Usd);
        let lines = vec![OrderLine::from_item("l1", "order-1", &candle, 1, Utc::now())];
        let mut d = discount(DiscountKind::Fixed, dec!(5.00));
        d.is_active = false;
        let mut snap = snapshot(lines, Some(d), None);

        snap.discount.as_mut().unwrap().is_active = true;

        let req = CheckoutRequest::for_order(&snap).unwrap();
        assert!(req.coupon.is_none());
        assert_eq!(req.amount, 5000);
    }

    #[test]
    fn test_rejects_non_pending_order() {
        let candle = item(dec!(10.00), Currency::Usd);
        let lines = vec![OrderLine::from_item("l1", "order-1", &candle, 1, Utc::now())];
        let mut snap = snapshot(lines, None, None);
        snap.order.mark_paid(Utc::now()).unwrap();

        let err = CheckoutRequest::for_order(&snap).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOrderStatus { .. }));
    }

    #[test]
    fn test_rejects_mixed_currency_lines() {
        let usd = item(dec!(10.00), Currency::Usd);
        let rub = item(dec!(10.00), Currency::Rub);
        let mut snap = snapshot(
            vec![OrderLine::from_item("l1", "order-1", &usd, 1, Utc::now())],
            None,
            None,
        );
        snap.lines
            .push(OrderLine::from_item("l2", "order-1", &rub, 1, Utc::now()));

        let err = CheckoutRequest::for_order(&snap).unwrap_err();
        assert!(matches!(err, CoreError::MixedCurrency { .. }));
    }

    #[test]
    fn test_rejects_currency_differing_from_stored() {
        let usd = item(dec!(10.00), Currency::Usd);
        let mut snap = snapshot(
            vec![OrderLine::from_item("l1", "order-1", &usd, 1, Utc::now())],
            None,
            None,
        );
        snap.order.currency = Currency::Eur;

        assert!(matches!(
            CheckoutRequest::for_order(&snap),
            Err(CoreError::MixedCurrency { .. })
        ));
    }
}
