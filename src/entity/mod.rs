pub mod audit_logs;
pub mod banners;
pub mod brands;
pub mod categories;
pub mod coupons;
pub mod order_items;
pub mod orders;
pub mod pages;
pub mod products;
pub mod reviews;
pub mod settings;
pub mod subcategories;
pub mod users;
pub mod variations;
pub mod wishlist_items;

pub use audit_logs::Entity as AuditLogs;
pub use banners::Entity as Banners;
pub use brands::Entity as Brands;
pub use categories::Entity as Categories;
pub use coupons::Entity as Coupons;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use pages::Entity as Pages;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use settings::Entity as Settings;
pub use subcategories::Entity as Subcategories;
pub use users::Entity as Users;
pub use variations::Entity as Variations;
pub use wishlist_items::Entity as WishlistItems;
