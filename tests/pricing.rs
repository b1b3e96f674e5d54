use rust_decimal::Decimal;
use storefront_api::pricing::{
    CouponKind, CouponRule, PricingLine, coupon_discount, effective_unit_price, price_cart,
    shipping_charge,
};
use uuid::Uuid;

fn line(category_id: Option<Uuid>, unit_price: Decimal, quantity: i32) -> PricingLine {
    PricingLine {
        product_id: Uuid::new_v4(),
        category_id,
        unit_price,
        quantity,
    }
}

fn flat_fee() -> Decimal {
    Decimal::from(60)
}

fn free_threshold() -> Decimal {
    Decimal::from(999)
}

#[test]
fn explicit_discount_price_wins_over_percent() {
    let price = effective_unit_price(Decimal::from(500), Some(Decimal::from(400)), Some(50));
    assert_eq!(price, Decimal::from(400));
}

#[test]
fn discount_percent_applies_and_rounds() {
    // 33.35 minus 10% is 30.015, rounded half away from zero.
    let price = effective_unit_price(Decimal::new(33_35, 2), None, Some(10));
    assert_eq!(price, Decimal::new(30_02, 2));
}

#[test]
fn bogus_discounts_are_ignored() {
    let base = Decimal::from(500);
    // Discount price above the base price is not a discount.
    assert_eq!(
        effective_unit_price(base, Some(Decimal::from(600)), None),
        base
    );
    assert_eq!(
        effective_unit_price(base, Some(Decimal::ZERO), None),
        base
    );
    assert_eq!(effective_unit_price(base, None, Some(0)), base);
    assert_eq!(effective_unit_price(base, None, Some(101)), base);
    assert_eq!(effective_unit_price(base, None, None), base);
}

#[test]
fn shipping_is_free_at_threshold() {
    assert_eq!(
        shipping_charge(Decimal::from(999), flat_fee(), free_threshold()),
        Decimal::ZERO
    );
    assert_eq!(
        shipping_charge(Decimal::from(998), flat_fee(), free_threshold()),
        flat_fee()
    );
    assert_eq!(
        shipping_charge(Decimal::ZERO, flat_fee(), free_threshold()),
        Decimal::ZERO
    );
}

#[test]
fn cart_over_threshold_ships_free() {
    let lines = vec![line(None, Decimal::from(500), 2)];
    let totals = price_cart(&lines, None, flat_fee(), free_threshold());
    assert_eq!(totals.subtotal, Decimal::from(1000));
    assert_eq!(totals.shipping, Decimal::ZERO);
    assert_eq!(totals.discount, Decimal::ZERO);
    assert_eq!(totals.total, Decimal::from(1000));
}

#[test]
fn small_cart_pays_flat_shipping() {
    let lines = vec![line(None, Decimal::from(100), 1)];
    let totals = price_cart(&lines, None, flat_fee(), free_threshold());
    assert_eq!(totals.subtotal, Decimal::from(100));
    assert_eq!(totals.shipping, flat_fee());
    assert_eq!(totals.total, Decimal::from(160));
}

#[test]
fn fixed_coupon_caps_at_eligible_subtotal() {
    let lines = vec![line(None, Decimal::from(100), 1)];
    let rule = CouponRule {
        kind: CouponKind::Fixed,
        value: Decimal::from(250),
        category_id: None,
        product_id: None,
    };
    let totals = price_cart(&lines, Some(&rule), flat_fee(), free_threshold());
    assert_eq!(totals.discount, Decimal::from(100));
    // Shipping still applies: 100 + 60 - 100.
    assert_eq!(totals.total, Decimal::from(60));
}

#[test]
fn total_never_goes_negative() {
    let lines = vec![line(None, Decimal::from(1000), 1)];
    let rule = CouponRule {
        kind: CouponKind::Fixed,
        value: Decimal::from(5000),
        category_id: None,
        product_id: None,
    };
    let totals = price_cart(&lines, Some(&rule), flat_fee(), free_threshold());
    assert_eq!(totals.discount, Decimal::from(1000));
    assert_eq!(totals.total, Decimal::ZERO);
}

#[test]
fn percentage_coupon_rounds_to_cents() {
    // 10% of 33.35 is 3.335, which rounds up to 3.34.
    let lines = vec![line(None, Decimal::new(33_35, 2), 1)];
    let rule = CouponRule {
        kind: CouponKind::Percentage,
        value: Decimal::from(10),
        category_id: None,
        product_id: None,
    };
    assert_eq!(coupon_discount(&lines, &rule), Decimal::new(3_34, 2));
}

#[test]
fn category_scoped_coupon_skips_other_lines() {
    let shoes = Uuid::new_v4();
    let books = Uuid::new_v4();
    let lines = vec![
        line(Some(shoes), Decimal::from(200), 1),
        line(Some(books), Decimal::from(300), 2),
    ];
    let rule = CouponRule {
        kind: CouponKind::Percentage,
        value: Decimal::from(50),
        category_id: Some(shoes),
        product_id: None,
    };
    // Half of the 200 shoes line only.
    assert_eq!(coupon_discount(&lines, &rule), Decimal::from(100));
}

#[test]
fn product_scoped_coupon_matches_one_line() {
    let lines = vec![
        line(None, Decimal::from(200), 1),
        line(None, Decimal::from(300), 1),
    ];
    let target = lines[1].product_id;
    let rule = CouponRule {
        kind: CouponKind::Fixed,
        value: Decimal::from(50),
        category_id: None,
        product_id: Some(target),
    };
    assert_eq!(coupon_discount(&lines, &rule), Decimal::from(50));
}

#[test]
fn scoped_coupon_with_no_eligible_lines_discounts_nothing() {
    let lines = vec![line(Some(Uuid::new_v4()), Decimal::from(200), 1)];
    let rule = CouponRule {
        kind: CouponKind::Fixed,
        value: Decimal::from(50),
        category_id: Some(Uuid::new_v4()),
        product_id: None,
    };
    assert_eq!(coupon_discount(&lines, &rule), Decimal::ZERO);
}

#[test]
fn coupon_kind_parses_known_values_only() {
    assert_eq!(CouponKind::parse("fixed"), Some(CouponKind::Fixed));
    assert_eq!(CouponKind::parse("percentage"), Some(CouponKind::Percentage));
    assert_eq!(CouponKind::parse("bogo"), None);
    assert_eq!(CouponKind::Fixed.as_str(), "fixed");
}
