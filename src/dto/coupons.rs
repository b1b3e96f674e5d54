use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::cart::CartItemInput, entity, models::Coupon};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyCouponRequest {
    pub code: String,
    pub items: Vec<CartItemInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponSummary {
    pub code: String,
    pub kind: String,
    pub value: Decimal,
}

impl From<&entity::coupons::Model> for CouponSummary {
    fn from(model: &entity::coupons::Model) -> Self {
        Self {
            code: model.code.clone(),
            kind: model.kind.clone(),
            value: model.value,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppliedCoupon {
    pub coupon: CouponSummary,
    pub discount: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCouponRequest {
    pub code: String,
    pub kind: String,
    pub value: Decimal,
    pub expires_at: DateTime<Utc>,
    pub active: Option<bool>,
    pub category_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub usage_limit: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCouponRequest {
    pub kind: Option<String>,
    pub value: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub category_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub usage_limit: Option<i32>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CouponList {
    #[schema(value_type = Vec<Coupon>)]
    pub items: Vec<Coupon>,
}
