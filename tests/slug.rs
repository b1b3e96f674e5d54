use storefront_api::slug::slugify;

#[test]
fn lowercases_and_joins_with_hyphens() {
    assert_eq!(slugify("Wireless Earbuds"), "wireless-earbuds");
    assert_eq!(slugify("Home & Kitchen"), "home-kitchen");
}

#[test]
fn collapses_symbol_runs() {
    assert_eq!(slugify("  Rust --- & Crab!! "), "rust-crab");
    assert_eq!(slugify("a   b  c"), "a-b-c");
}

#[test]
fn never_emits_leading_or_trailing_hyphens() {
    assert_eq!(slugify("!!!abc"), "abc");
    assert_eq!(slugify("abc???"), "abc");
}

#[test]
fn already_slugged_input_is_unchanged() {
    assert_eq!(slugify("steel-water-bottle"), "steel-water-bottle");
}

#[test]
fn falls_back_when_nothing_survives() {
    assert_eq!(slugify("!!!"), "item");
    assert_eq!(slugify(""), "item");
}
