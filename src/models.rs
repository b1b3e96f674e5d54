use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{entity, pricing};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::users::Model> for User {
    fn from(model: entity::users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::categories::Model> for Category {
    fn from(model: entity::categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            image: model.image,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Subcategory {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::subcategories::Model> for Subcategory {
    fn from(model: entity::subcategories::Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            name: model.name,
            slug: model.slug,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::brands::Model> for Brand {
    fn from(model: entity::brands::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            logo: model.logo,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub discount_percent: Option<i32>,
    /// Unit price after product-level discounts; what the storefront displays.
    pub sale_price: Decimal,
    pub stock: i32,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub featured: bool,
    pub trending: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::products::Model> for Product {
    fn from(model: entity::products::Model) -> Self {
        let sale_price = pricing::effective_unit_price(
            model.price,
            model.discount_price,
            model.discount_percent,
        );
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            price: model.price,
            discount_price: model.discount_price,
            discount_percent: model.discount_percent,
            sale_price,
            stock: model.stock,
            category_id: model.category_id,
            subcategory_id: model.subcategory_id,
            brand_id: model.brand_id,
            images: serde_json::from_value(model.images).unwrap_or_default(),
            video: model.video,
            featured: model.featured,
            trending: model.trending,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Variation {
    pub id: Uuid,
    pub product_id: Uuid,
    pub color: String,
    pub size: String,
    pub price: Decimal,
    pub stock: i32,
}

impl From<entity::variations::Model> for Variation {
    fn from(model: entity::variations::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            color: model.color,
            size: model.size,
            price: model.price,
            stock: model.stock,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Banner {
    pub id: Uuid,
    pub page: String,
    pub image: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::banners::Model> for Banner {
    fn from(model: entity::banners::Model) -> Self {
        Self {
            id: model.id,
            page: model.page,
            image: model.image,
            title: model.title,
            link: model.link,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Page {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::pages::Model> for Page {
    fn from(model: entity::pages::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            content: model.content,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Settings {
    pub site_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
    pub logo: Option<String>,
    pub favicon: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_name: "Storefront".to_string(),
            contact_email: String::new(),
            contact_phone: String::new(),
            address: String::new(),
            facebook: None,
            instagram: None,
            twitter: None,
            youtube: None,
            logo: None,
            favicon: None,
        }
    }
}

impl From<entity::settings::Model> for Settings {
    fn from(model: entity::settings::Model) -> Self {
        Self {
            site_name: model.site_name,
            contact_email: model.contact_email,
            contact_phone: model.contact_phone,
            address: model.address,
            facebook: model.facebook,
            instagram: model.instagram,
            twitter: model.twitter,
            youtube: model.youtube,
            logo: model.logo,
            favicon: model.favicon,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub kind: String,
    pub value: Decimal,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
    pub category_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub used_count: i32,
    pub usage_limit: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::coupons::Model> for Coupon {
    fn from(model: entity::coupons::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            kind: model.kind,
            value: model.value,
            expires_at: model.expires_at.with_timezone(&Utc),
            active: model.active,
            category_id: model.category_id,
            product_id: model.product_id,
            used_count: model.used_count,
            usage_limit: model.usage_limit,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_id: Option<Uuid>,
    pub address: String,
    pub phone: String,
    pub payment_method: String,
    pub payment_id: Option<String>,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::orders::Model> for Order {
    fn from(model: entity::orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            status: model.status,
            subtotal: model.subtotal,
            shipping: model.shipping,
            discount: model.discount,
            total: model.total,
            coupon_id: model.coupon_id,
            address: model.address,
            phone: model.phone,
            payment_method: model.payment_method,
            payment_id: model.payment_id,
            payment_status: model.payment_status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub variation_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub color: Option<String>,
    pub size: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::order_items::Model> for OrderItem {
    fn from(model: entity::order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            variation_id: model.variation_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            color: model.color,
            size: model.size,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::reviews::Model> for Review {
    fn from(model: entity::reviews::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            rating: model.rating,
            comment: model.comment,
            approved: model.approved,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WishlistItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<entity::wishlist_items::Model> for WishlistItem {
    fn from(model: entity::wishlist_items::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
