use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One cart line with its server-resolved unit price. Client-supplied prices
/// never reach this module.
#[derive(Debug, Clone)]
pub struct PricingLine {
    pub product_id: Uuid,
    pub category_id: Option<Uuid>,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl PricingLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    Fixed,
    Percentage,
}

impl CouponKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "fixed" => Some(CouponKind::Fixed),
            "percentage" => Some(CouponKind::Percentage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CouponKind::Fixed => "fixed",
            CouponKind::Percentage => "percentage",
        }
    }
}

/// Discount terms of a validated coupon. Scope narrows the eligible lines to
/// one category or one product; unscoped coupons apply to the whole cart.
#[derive(Debug, Clone)]
pub struct CouponRule {
    pub kind: CouponKind,
    pub value: Decimal,
    pub category_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Unit price after product-level discounts: an explicit discount price wins,
/// otherwise the percentage is applied and rounded to two decimals.
pub fn effective_unit_price(
    price: Decimal,
    discount_price: Option<Decimal>,
    discount_percent: Option<i32>,
) -> Decimal {
    if let Some(discounted) = discount_price.filter(|d| *d > Decimal::ZERO && *d < price) {
        return discounted;
    }
    if let Some(pct) = discount_percent.filter(|p| *p > 0 && *p <= 100) {
        let off = price * Decimal::from(pct) / Decimal::from(100);
        return round_money(price - off);
    }
    price
}

pub fn subtotal(lines: &[PricingLine]) -> Decimal {
    lines.iter().map(PricingLine::line_total).sum()
}

/// Flat fee below the free-shipping threshold, free at or above it. An empty
/// cart ships nothing.
pub fn shipping_charge(subtotal: Decimal, flat_fee: Decimal, free_threshold: Decimal) -> Decimal {
    if subtotal > Decimal::ZERO && subtotal < free_threshold {
        flat_fee
    } else {
        Decimal::ZERO
    }
}

/// Discount for a coupon against the eligible slice of the cart. Fixed
/// coupons never exceed the eligible subtotal; percentage coupons round to
/// two decimals.
pub fn coupon_discount(lines: &[PricingLine], rule: &CouponRule) -> Decimal {
    let eligible: Decimal = lines
        .iter()
        .filter(|line| {
            if let Some(product_id) = rule.product_id {
                return line.product_id == product_id;
            }
            if let Some(category_id) = rule.category_id {
                return line.category_id == Some(category_id);
            }
            true
        })
        .map(PricingLine::line_total)
        .sum();

    if eligible <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match rule.kind {
        CouponKind::Fixed => rule.value.min(eligible),
        CouponKind::Percentage => round_money(eligible * rule.value / Decimal::from(100)),
    }
}

/// Full cart computation: subtotal, shipping against the threshold, coupon
/// discount, and a total clamped at zero.
pub fn price_cart(
    lines: &[PricingLine],
    rule: Option<&CouponRule>,
    flat_fee: Decimal,
    free_threshold: Decimal,
) -> CartTotals {
    let subtotal = subtotal(lines);
    let shipping = shipping_charge(subtotal, flat_fee, free_threshold);
    let discount = rule
        .map(|r| coupon_discount(lines, r))
        .unwrap_or(Decimal::ZERO);
    let total = (subtotal + shipping - discount).max(Decimal::ZERO);
    CartTotals {
        subtotal,
        shipping,
        discount,
        total,
    }
}

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
