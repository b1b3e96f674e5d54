use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i16,
    pub comment: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewWithUser {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: i16,
    pub comment: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl ReviewWithUser {
    pub fn new(review: entity::reviews::Model, user: Option<entity::users::Model>) -> Self {
        Self {
            id: review.id,
            product_id: review.product_id,
            user_id: review.user_id,
            user_name: user.map(|u| u.name).unwrap_or_default(),
            rating: review.rating,
            comment: review.comment,
            approved: review.approved,
            created_at: review.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReviewList {
    #[schema(value_type = Vec<ReviewWithUser>)]
    pub items: Vec<ReviewWithUser>,
}
