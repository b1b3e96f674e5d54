use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin as admin_dto, auth as auth_dto, cart as cart_dto, catalog, content as content_dto,
        coupons as coupon_dto, orders as order_dto, payment as payment_dto, reviews as review_dto,
        wishlist as wishlist_dto,
    },
    models::{
        Banner, Brand, Category, Coupon, Order, OrderItem, Page, Product, Review, Settings,
        Subcategory, User, Variation, WishlistItem,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, brands, cart, categories, content, coupons, health, orders, params, payment,
        products, reviews, wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        products::list_products,
        products::featured_products,
        products::trending_products,
        products::get_product,
        products::list_products_admin,
        products::create_product,
        products::update_product,
        products::delete_product,
        reviews::list_product_reviews,
        reviews::create_product_review,
        reviews::list_reviews_admin,
        reviews::approve_review,
        reviews::delete_review,
        categories::list_categories,
        categories::list_categories_admin,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        categories::list_subcategories_admin,
        categories::create_subcategory,
        categories::update_subcategory,
        categories::delete_subcategory,
        brands::list_brands,
        brands::list_brands_admin,
        brands::create_brand,
        brands::update_brand,
        brands::delete_brand,
        content::list_banners,
        content::get_page,
        content::get_settings,
        content::list_banners_admin,
        content::create_banner,
        content::update_banner,
        content::delete_banner,
        content::list_pages_admin,
        content::create_page,
        content::update_page,
        content::delete_page,
        content::update_settings,
        cart::quote,
        coupons::apply,
        coupons::list_coupons,
        coupons::create_coupon,
        coupons::update_coupon,
        coupons::delete_coupon,
        orders::place_order,
        orders::list_orders,
        orders::get_order,
        payment::create_gateway_order,
        payment::verify_payment,
        wishlist::list_wishlist,
        wishlist::add_wishlist,
        wishlist::remove_wishlist,
        admin::stats,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::list_users,
        admin::update_user_role,
        admin::delete_user,
        admin::list_low_stock,
        admin::adjust_inventory
    ),
    components(
        schemas(
            User,
            Category,
            Subcategory,
            Brand,
            Product,
            Variation,
            Banner,
            Page,
            Settings,
            Coupon,
            Order,
            OrderItem,
            Review,
            WishlistItem,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            catalog::CategoryWithSubcategories,
            catalog::CategoryList,
            catalog::SubcategoryList,
            catalog::BrandList,
            catalog::ProductList,
            catalog::ProductDetail,
            catalog::VariationInput,
            content_dto::BannerList,
            content_dto::PageList,
            cart_dto::CartItemInput,
            cart_dto::QuoteRequest,
            cart_dto::QuotedLine,
            cart_dto::CartQuote,
            coupon_dto::CouponSummary,
            coupon_dto::AppliedCoupon,
            coupon_dto::CouponList,
            order_dto::OrderWithItems,
            order_dto::OrderList,
            payment_dto::GatewayOrderData,
            payment_dto::PaymentVerified,
            review_dto::ReviewWithUser,
            review_dto::ReviewList,
            wishlist_dto::WishlistProducts,
            admin_dto::StatsData,
            admin_dto::UserList,
            params::Pagination,
            Meta,
            ApiResponse<Product>,
            ApiResponse<catalog::ProductList>,
            ApiResponse<catalog::ProductDetail>,
            ApiResponse<order_dto::OrderWithItems>,
            ApiResponse<order_dto::OrderList>,
            ApiResponse<cart_dto::CartQuote>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Catalog", description = "Category and brand endpoints"),
        (name = "Products", description = "Product browsing endpoints"),
        (name = "Content", description = "Banner, page and settings endpoints"),
        (name = "Cart", description = "Cart pricing endpoints"),
        (name = "Coupons", description = "Coupon endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Payment", description = "Payment gateway endpoints"),
        (name = "Reviews", description = "Product review endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
