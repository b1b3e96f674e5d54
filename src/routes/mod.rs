use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod content;
pub mod coupons;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod payment;
pub mod products;
pub mod reviews;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/brands", brands::router())
        .nest("/cart", cart::router())
        .nest("/coupons", coupons::router())
        .nest("/orders", orders::router())
        .nest("/payment", payment::router())
        .nest("/wishlist", wishlist::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .merge(content::router())
}
