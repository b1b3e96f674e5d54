use storefront_api::response::Meta;
use storefront_api::routes::params::Pagination;

#[test]
fn meta_computes_last_page() {
    let meta = Meta::new(2, 20, 45);
    assert_eq!(meta.page, Some(2));
    assert_eq!(meta.per_page, Some(20));
    assert_eq!(meta.total, Some(45));
    assert_eq!(meta.last_page, Some(3));
}

#[test]
fn meta_has_at_least_one_page_when_empty() {
    let meta = Meta::new(1, 20, 0);
    assert_eq!(meta.last_page, Some(1));
}

#[test]
fn empty_meta_is_all_none() {
    let meta = Meta::empty();
    assert_eq!(meta.page, None);
    assert_eq!(meta.total, None);
    assert_eq!(meta.last_page, None);
}

#[test]
fn pagination_defaults_to_first_page_of_twenty() {
    let pagination = Pagination {
        page: None,
        per_page: None,
    };
    assert_eq!(pagination.normalize(), (1, 20, 0));
}

#[test]
fn pagination_clamps_out_of_range_values() {
    let oversized = Pagination {
        page: Some(0),
        per_page: Some(1000),
    };
    assert_eq!(oversized.normalize(), (1, 100, 0));

    let negative = Pagination {
        page: Some(-3),
        per_page: Some(0),
    };
    assert_eq!(negative.normalize(), (1, 1, 0));
}

#[test]
fn pagination_offset_skips_previous_pages() {
    let pagination = Pagination {
        page: Some(3),
        per_page: Some(10),
    };
    assert_eq!(pagination.normalize(), (3, 10, 20));
}
