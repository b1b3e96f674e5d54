use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsData {
    pub products: i64,
    pub orders: i64,
    pub users: i64,
    pub pending_reviews: i64,
    /// Sum of order totals excluding cancelled orders.
    pub revenue: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<User>)]
    pub items: Vec<User>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    /// Signed quantity added to the current stock; the result must stay
    /// non-negative.
    pub delta: i32,
}
