pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod content;
pub mod coupons;
pub mod orders;
pub mod payment;
pub mod reviews;
pub mod wishlist;
