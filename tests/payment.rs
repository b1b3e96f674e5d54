use rust_decimal::Decimal;
use storefront_api::payment::{payment_signature, to_minor_units, verify_payment_signature};

// Expected digests generated with `openssl dgst -sha256 -hmac`.
const SECRET: &str = "test_gateway_secret";
const ORDER_ID: &str = "order_GATEWAY123";
const PAYMENT_ID: &str = "pay_GATEWAY456";
const EXPECTED: &str = "cb1949e31343c40ef6b1fa177299fae4398d215723bbb3638108135775e9f330";

#[test]
fn signature_matches_known_vector() {
    let sig = payment_signature(SECRET, ORDER_ID, PAYMENT_ID).unwrap();
    assert_eq!(sig, EXPECTED);
}

#[test]
fn signature_matches_second_vector() {
    let sig = payment_signature("s3cr3t", "order_A", "pay_B").unwrap();
    assert_eq!(
        sig,
        "5d33b96455a6ead0af3c0f6572b254947c79433521179346d4ecc511f37da2fb"
    );
}

#[test]
fn verify_accepts_own_signature() {
    let sig = payment_signature(SECRET, ORDER_ID, PAYMENT_ID).unwrap();
    assert!(verify_payment_signature(SECRET, ORDER_ID, PAYMENT_ID, &sig).unwrap());
}

#[test]
fn verify_rejects_tampered_payment_id() {
    let sig = payment_signature(SECRET, ORDER_ID, PAYMENT_ID).unwrap();
    assert!(!verify_payment_signature(SECRET, ORDER_ID, "pay_OTHER", &sig).unwrap());
}

#[test]
fn verify_rejects_wrong_secret() {
    let sig = payment_signature(SECRET, ORDER_ID, PAYMENT_ID).unwrap();
    assert!(!verify_payment_signature("other_secret", ORDER_ID, PAYMENT_ID, &sig).unwrap());
}

#[test]
fn verify_treats_bad_hex_as_mismatch() {
    let verified =
        verify_payment_signature(SECRET, ORDER_ID, PAYMENT_ID, "not-hex-at-all").unwrap();
    assert!(!verified);
}

#[test]
fn minor_units_scale_by_hundred() {
    assert_eq!(to_minor_units(Decimal::new(499_50, 2)).unwrap(), 49_950);
    assert_eq!(to_minor_units(Decimal::from(2_499)).unwrap(), 249_900);
    assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
}

#[test]
fn minor_units_round_sub_cent_amounts() {
    // 10.005 rounds half away from zero before scaling.
    assert_eq!(to_minor_units(Decimal::new(10_005, 3)).unwrap(), 1_001);
}
