use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        cart::CartItemInput,
        catalog::{
            CreateBrandRequest, CreateCategoryRequest, CreateProductRequest,
            UpdateProductRequest, VariationInput,
        },
        content::{CreateBannerRequest, CreatePageRequest, UpdateSettingsRequest},
        coupons::{ApplyCouponRequest, CreateCouponRequest},
        reviews::CreateReviewRequest,
        wishlist::AddWishlistRequest,
    },
    entity::users::ActiveModel as UserActive,
    error::AppError,
    mailer::Mailer,
    middleware::auth::AuthUser,
    payment::GatewayClient,
    routes::params::{Pagination, ProductQuery, ProductSort, ReviewListQuery},
    services::{
        auth_service, brand_service, category_service, content_service, coupon_service,
        product_service, review_service, wishlist_service,
    },
    state::AppState,
};

// End-to-end catalog management: accounts, admin CRUD, public browsing,
// reviews, wishlist, coupons, and storefront content. Requires a database.
#[tokio::test]
async fn catalog_reviews_and_content_flow() -> anyhow::Result<()> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    // Token signing reads JWT_SECRET from the environment.
    unsafe { std::env::set_var("JWT_SECRET", "test-secret") };

    let state = setup_state(&database_url).await?;
    let admin = create_admin(&state, "ops@example.com").await?;

    // Registration assigns the user role; the email is then taken.
    let registered = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password: "correct horse".into(),
        },
    )
    .await?;
    let registered = registered.data.unwrap();
    assert_eq!(registered.role, "user");
    let duplicate = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Asha Again".into(),
            email: "asha@example.com".into(),
            password: "other".into(),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "asha@example.com".into(),
            password: "correct horse".into(),
        },
    )
    .await?;
    assert!(login.data.unwrap().token.starts_with("Bearer "));
    let bad_login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "asha@example.com".into(),
            password: "wrong".into(),
        },
    )
    .await;
    assert!(matches!(bad_login, Err(AppError::BadRequest(_))));

    let buyer = AuthUser {
        user_id: registered.id,
        role: registered.role.clone(),
    };

    // Category slugs derive from the name and must stay unique.
    let audio = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Home Audio".into(),
            slug: None,
            image: None,
            active: None,
        },
    )
    .await?;
    let audio = audio.data.unwrap();
    assert_eq!(audio.slug, "home-audio");
    let clash = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Home Audio".into(),
            slug: None,
            image: None,
            active: None,
        },
    )
    .await;
    assert!(matches!(clash, Err(AppError::BadRequest(_))));
    let forbidden = category_service::create_category(
        &state,
        &buyer,
        CreateCategoryRequest {
            name: "Hacks".into(),
            slug: None,
            image: None,
            active: None,
        },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let lighting = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Lighting".into(),
            slug: None,
            image: None,
            active: None,
        },
    )
    .await?;
    let lighting = lighting.data.unwrap();

    let acme = brand_service::create_brand(
        &state,
        &admin,
        CreateBrandRequest {
            name: "Acme".into(),
            slug: None,
            logo: None,
            active: None,
        },
    )
    .await?;
    let acme = acme.data.unwrap();
    assert_eq!(acme.slug, "acme");
    let brands = brand_service::list_brands(&state).await?;
    assert_eq!(brands.data.unwrap().items.len(), 1);

    // Product creation persists variations alongside the product.
    let earbuds = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "Wireless Earbuds".into(),
            slug: None,
            description: "Noise cancelling in-ear buds".into(),
            price: Decimal::from(2499),
            discount_price: Some(Decimal::from(1999)),
            discount_percent: None,
            stock: 25,
            category_id: audio.id,
            subcategory_id: None,
            brand_id: Some(acme.id),
            images: Some(vec!["https://cdn.example.com/earbuds.jpg".into()]),
            video: None,
            featured: Some(true),
            trending: Some(false),
            active: None,
            variations: Some(vec![
                VariationInput {
                    color: "Black".into(),
                    size: "Standard".into(),
                    price: Decimal::from(2499),
                    stock: 10,
                },
                VariationInput {
                    color: "White".into(),
                    size: "Standard".into(),
                    price: Decimal::from(2499),
                    stock: 15,
                },
            ]),
        },
    )
    .await?;
    let earbuds = earbuds.data.unwrap();
    assert_eq!(earbuds.product.slug, "wireless-earbuds");
    assert_eq!(earbuds.product.sale_price, Decimal::from(1999));
    assert_eq!(earbuds.variations.len(), 2);
    let earbuds_id = earbuds.product.id;

    let slug_taken = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "Wireless Earbuds".into(),
            slug: None,
            description: "Second copy".into(),
            price: Decimal::from(100),
            discount_price: None,
            discount_percent: None,
            stock: 1,
            category_id: audio.id,
            subcategory_id: None,
            brand_id: None,
            images: None,
            video: None,
            featured: None,
            trending: None,
            active: None,
            variations: None,
        },
    )
    .await;
    assert!(matches!(slug_taken, Err(AppError::BadRequest(_))));

    let lamp = product_service::create_product(
        &state,
        &admin,
        CreateProductRequest {
            name: "Desk Lamp".into(),
            slug: None,
            description: "Adjustable arm, warm light".into(),
            price: Decimal::from(799),
            discount_price: None,
            discount_percent: None,
            stock: 40,
            category_id: lighting.id,
            subcategory_id: None,
            brand_id: None,
            images: None,
            video: None,
            featured: None,
            trending: Some(true),
            active: None,
            variations: None,
        },
    )
    .await?;
    let lamp_id = lamp.data.unwrap().product.id;

    // Public browsing: search, category and brand filters, price cap, sorting.
    let all = product_service::list_products(&state, product_query(None, None, None, None)).await?;
    assert_eq!(all.data.unwrap().items.len(), 2);
    let searched =
        product_service::list_products(&state, product_query(Some("earbuds"), None, None, None))
            .await?;
    assert_eq!(searched.data.unwrap().items.len(), 1);
    let in_audio = product_service::list_products(
        &state,
        product_query(None, Some("home-audio"), None, None),
    )
    .await?;
    let in_audio = in_audio.data.unwrap();
    assert_eq!(in_audio.items.len(), 1);
    assert_eq!(in_audio.items[0].id, earbuds_id);
    let cheap =
        product_service::list_products(&state, product_query(None, None, Some(800), None)).await?;
    let cheap = cheap.data.unwrap();
    assert_eq!(cheap.items.len(), 1);
    assert_eq!(cheap.items[0].id, lamp_id);
    let by_price = product_service::list_products(
        &state,
        product_query(None, None, None, Some(ProductSort::PriceLow)),
    )
    .await?;
    assert_eq!(by_price.data.unwrap().items[0].id, lamp_id);

    let mut by_brand = product_query(None, None, None, None);
    by_brand.brands = Some("acme".into());
    let by_brand = product_service::list_products(&state, by_brand).await?;
    assert_eq!(by_brand.data.unwrap().items[0].id, earbuds_id);

    // Detail lookup works by slug or id; unknown slugs are a 404.
    let by_slug = product_service::get_product(&state, "wireless-earbuds").await?;
    assert_eq!(by_slug.data.unwrap().variations.len(), 2);
    let by_id = product_service::get_product(&state, &earbuds_id.to_string()).await?;
    assert_eq!(by_id.data.unwrap().product.id, earbuds_id);
    let missing = product_service::get_product(&state, "does-not-exist").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let featured = product_service::featured_products(&state).await?;
    let featured = featured.data.unwrap();
    assert_eq!(featured.items.len(), 1);
    assert_eq!(featured.items[0].id, earbuds_id);
    let trending = product_service::trending_products(&state).await?;
    assert!(trending.data.unwrap().items.iter().any(|p| p.id == lamp_id));

    // Updating with a variation list replaces the whole set.
    let updated = product_service::update_product(
        &state,
        &admin,
        earbuds_id,
        UpdateProductRequest {
            name: None,
            description: None,
            price: Some(Decimal::from(2299)),
            discount_price: None,
            discount_percent: None,
            stock: None,
            category_id: None,
            subcategory_id: None,
            brand_id: None,
            images: None,
            video: None,
            featured: None,
            trending: None,
            active: None,
            variations: Some(vec![VariationInput {
                color: "Black".into(),
                size: "Standard".into(),
                price: Decimal::from(2299),
                stock: 12,
            }]),
        },
    )
    .await?;
    let updated = updated.data.unwrap();
    assert_eq!(updated.product.price, Decimal::from(2299));
    assert_eq!(updated.variations.len(), 1);

    // Reviews go live only after approval; one review per user and product.
    let bad_rating = review_service::upsert_review(
        &state,
        &buyer,
        earbuds_id,
        CreateReviewRequest {
            rating: 0,
            comment: "".into(),
        },
    )
    .await;
    assert!(matches!(bad_rating, Err(AppError::BadRequest(_))));

    let review = review_service::upsert_review(
        &state,
        &buyer,
        earbuds_id,
        CreateReviewRequest {
            rating: 5,
            comment: "Great sound".into(),
        },
    )
    .await?;
    let review = review.data.unwrap();
    assert!(!review.approved);

    let visible =
        review_service::list_product_reviews(&state, earbuds_id, Pagination::default()).await?;
    assert!(visible.data.unwrap().items.is_empty());

    let pending = review_service::list_reviews_admin(
        &state,
        &admin,
        ReviewListQuery {
            page: None,
            per_page: None,
            approved: Some(false),
        },
    )
    .await?;
    assert_eq!(pending.data.unwrap().items.len(), 1);

    let approved = review_service::approve_review(&state, &admin, review.id).await?;
    assert!(approved.data.unwrap().approved);

    let visible =
        review_service::list_product_reviews(&state, earbuds_id, Pagination::default()).await?;
    let visible = visible.data.unwrap();
    assert_eq!(visible.items.len(), 1);
    assert_eq!(visible.items[0].user_name, "Asha");
    assert_eq!(visible.items[0].rating, 5);

    // A second submission from the same user edits the existing review.
    review_service::upsert_review(
        &state,
        &buyer,
        earbuds_id,
        CreateReviewRequest {
            rating: 4,
            comment: "Still great, battery fades".into(),
        },
    )
    .await?;
    let visible =
        review_service::list_product_reviews(&state, earbuds_id, Pagination::default()).await?;
    let visible = visible.data.unwrap();
    assert_eq!(visible.items.len(), 1);
    assert_eq!(visible.items[0].rating, 4);

    // Wishlist adds are idempotent; removal of an absent entry is a 404.
    let added = wishlist_service::add_wishlist(
        &state,
        &buyer,
        AddWishlistRequest {
            product_id: earbuds_id,
        },
    )
    .await?;
    let added = added.data.unwrap();
    let again = wishlist_service::add_wishlist(
        &state,
        &buyer,
        AddWishlistRequest {
            product_id: earbuds_id,
        },
    )
    .await?;
    assert_eq!(again.data.unwrap().id, added.id);
    let wishlist = wishlist_service::list_wishlist(&state, &buyer, Pagination::default()).await?;
    let wishlist = wishlist.data.unwrap();
    assert_eq!(wishlist.items.len(), 1);
    assert_eq!(wishlist.items[0].id, earbuds_id);
    wishlist_service::remove_wishlist(&state, &buyer, earbuds_id).await?;
    let gone = wishlist_service::remove_wishlist(&state, &buyer, earbuds_id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));

    // Coupon values are validated per kind; codes normalize to uppercase.
    let zero = coupon_service::create_coupon(&state, &admin, coupon_request("ZERO", "fixed", 0, 30))
        .await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));
    let over = coupon_service::create_coupon(
        &state,
        &admin,
        coupon_request("BROKEN", "percentage", 150, 30),
    )
    .await;
    assert!(matches!(over, Err(AppError::BadRequest(_))));

    let summer = coupon_service::create_coupon(
        &state,
        &admin,
        coupon_request(" summer15 ", "percentage", 15, 30),
    )
    .await?;
    assert_eq!(summer.data.unwrap().code, "SUMMER15");

    let applied = coupon_service::apply_coupon(
        &state,
        ApplyCouponRequest {
            code: "summer15".into(),
            items: vec![CartItemInput {
                product_id: earbuds_id,
                variation_id: None,
                quantity: 1,
                color: None,
                size: None,
            }],
        },
    )
    .await?;
    assert_eq!(applied.data.unwrap().discount, Decimal::new(29985, 2));

    coupon_service::create_coupon(&state, &admin, coupon_request("OLD10", "fixed", 10, -1)).await?;
    let expired = coupon_service::apply_coupon(
        &state,
        ApplyCouponRequest {
            code: "OLD10".into(),
            items: vec![],
        },
    )
    .await;
    assert!(matches!(expired, Err(AppError::BadRequest(_))));

    // Settings fall back to defaults until the singleton row is written.
    let defaults = content_service::get_settings(&state).await?;
    assert_eq!(defaults.data.unwrap().site_name, "Storefront");
    content_service::update_settings(
        &state,
        &admin,
        UpdateSettingsRequest {
            site_name: Some("Aurora Mart".into()),
            contact_email: Some("hello@auroramart.test".into()),
            contact_phone: None,
            address: None,
            facebook: None,
            instagram: None,
            twitter: None,
            youtube: None,
            logo: None,
            favicon: None,
        },
    )
    .await?;
    let settings = content_service::get_settings(&state).await?;
    let settings = settings.data.unwrap();
    assert_eq!(settings.site_name, "Aurora Mart");
    assert_eq!(settings.contact_email, "hello@auroramart.test");

    // Pages resolve by slug; inactive pages are hidden from the storefront.
    let about = content_service::create_page(
        &state,
        &admin,
        CreatePageRequest {
            title: "About Us".into(),
            slug: None,
            content: "We sell things.".into(),
            active: None,
        },
    )
    .await?;
    assert_eq!(about.data.unwrap().slug, "about-us");
    let fetched = content_service::get_page(&state, "about-us").await?;
    assert_eq!(fetched.data.unwrap().title, "About Us");

    content_service::create_page(
        &state,
        &admin,
        CreatePageRequest {
            title: "Careers".into(),
            slug: None,
            content: "Draft".into(),
            active: Some(false),
        },
    )
    .await?;
    let hidden = content_service::get_page(&state, "careers").await;
    assert!(matches!(hidden, Err(AppError::NotFound(_))));

    // Banners filter by placement.
    content_service::create_banner(
        &state,
        &admin,
        CreateBannerRequest {
            page: "home".into(),
            image: "https://cdn.example.com/hero.jpg".into(),
            title: Some("Monsoon sale".into()),
            link: None,
            active: None,
        },
    )
    .await?;
    content_service::create_banner(
        &state,
        &admin,
        CreateBannerRequest {
            page: "category".into(),
            image: "https://cdn.example.com/strip.jpg".into(),
            title: None,
            link: None,
            active: None,
        },
    )
    .await?;
    let home = content_service::list_banners(&state, Some("home".into())).await?;
    assert_eq!(home.data.unwrap().items.len(), 1);
    let everywhere = content_service::list_banners(&state, None).await?;
    assert_eq!(everywhere.data.unwrap().items.len(), 2);

    Ok(())
}

fn product_query(
    q: Option<&str>,
    categories: Option<&str>,
    max_price: Option<i64>,
    sort: Option<ProductSort>,
) -> ProductQuery {
    ProductQuery {
        page: None,
        per_page: None,
        q: q.map(str::to_string),
        categories: categories.map(str::to_string),
        brands: None,
        max_price: max_price.map(Decimal::from),
        sort,
    }
}

fn coupon_request(code: &str, kind: &str, value: i64, expires_in_days: i64) -> CreateCouponRequest {
    CreateCouponRequest {
        code: code.into(),
        kind: kind.into(),
        value: Decimal::from(value),
        expires_at: Utc::now() + Duration::days(expires_in_days),
        active: None,
        category_id: None,
        product_id: None,
        usage_limit: None,
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, wishlist_items, reviews, variations, products, \
         subcategories, categories, brands, coupons, banners, pages, settings, audit_logs, users \
         RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        environment: "test".into(),
        frontend_base_url: "http://localhost:5173".into(),
        shipping_flat_fee: Decimal::from(60),
        free_shipping_threshold: Decimal::from(999),
        gateway_base_url: "http://localhost:9".into(),
        gateway_key_id: "rzp_test_key".into(),
        gateway_key_secret: "s3cr3t".into(),
        smtp_host: None,
        smtp_port: 587,
        smtp_username: None,
        smtp_password: None,
        smtp_from: "store@localhost".into(),
    };
    let gateway = GatewayClient::from_config(&config);
    Ok(AppState {
        pool,
        orm,
        config,
        mailer: Mailer::disabled(),
        gateway,
    })
}

async fn create_admin(state: &AppState, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        name: Set("Ops".into()),
        role: Set("admin".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}
