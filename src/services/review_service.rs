use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::reviews::{CreateReviewRequest, ReviewList, ReviewWithUser},
    entity::{
        products::Entity as Products,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, ReviewListQuery},
    state::AppState,
};

/// One review per user per product: a second submit updates the earlier one.
/// New reviews wait for moderation before they show up publicly.
pub async fn upsert_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 5".into()));
    }

    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    let product = match product {
        Some(p) if p.active => p,
        _ => return Err(AppError::NotFound("Product")),
    };

    let existing = Reviews::find()
        .filter(
            Condition::all()
                .add(ReviewCol::UserId.eq(user.user_id))
                .add(ReviewCol::ProductId.eq(product.id)),
        )
        .one(&state.orm)
        .await?;

    let (review, action) = match existing {
        Some(current) => {
            let mut active: ReviewActive = current.into();
            active.rating = Set(payload.rating);
            active.comment = Set(payload.comment);
            (active.update(&state.orm).await?, "review_update")
        }
        None => {
            let active = ReviewActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                product_id: Set(product.id),
                rating: Set(payload.rating),
                comment: Set(payload.comment),
                approved: Set(false),
                created_at: NotSet,
            };
            (active.insert(&state.orm).await?, "review_create")
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        action,
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review.id, "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review saved",
        review.into(),
        Some(Meta::empty()),
    ))
}

/// Public listing: approved reviews only, newest first, with reviewer names.
pub async fn list_product_reviews(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();
    let condition = Condition::all()
        .add(ReviewCol::ProductId.eq(product_id))
        .add(ReviewCol::Approved.eq(true));

    let total = Reviews::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let items = Reviews::find()
        .filter(condition)
        .order_by_desc(ReviewCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(review, user)| ReviewWithUser::new(review, user))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(meta),
    ))
}

pub async fn list_reviews_admin(
    state: &AppState,
    user: &AuthUser,
    query: ReviewListQuery,
) -> AppResult<ApiResponse<ReviewList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(approved) = query.approved {
        condition = condition.add(ReviewCol::Approved.eq(approved));
    }

    let total = Reviews::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let items = Reviews::find()
        .filter(condition)
        .order_by_desc(ReviewCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Users)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(review, reviewer)| ReviewWithUser::new(review, reviewer))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(meta),
    ))
}

pub async fn approve_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Review>> {
    ensure_admin(user)?;
    let existing = Reviews::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound("Review")),
    };

    let mut active: ReviewActive = existing.into();
    active.approved = Set(true);
    let review = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "review_approve",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review approved",
        review.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Reviews::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Review"));
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "review_delete",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
