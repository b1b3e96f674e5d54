use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::wishlist::{AddWishlistRequest, WishlistProducts},
    entity::{
        products::Entity as Products,
        wishlist_items::{
            ActiveModel as WishlistActive, Column as WishlistCol, Entity as WishlistItems,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, WishlistItem},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistProducts>> {
    let (page, limit, offset) = pagination.normalize();

    let total = WishlistItems::find()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await? as i64;

    let items = WishlistItems::find()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .order_by_desc(WishlistCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(_, product)| product.map(Product::from))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Wishlist",
        WishlistProducts { items },
        Some(meta),
    ))
}

/// Adding twice is a no-op: the unique (user, product) constraint catches the
/// duplicate and the existing entry is returned.
pub async fn add_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<WishlistItem>> {
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) if p.active => p,
        _ => return Err(AppError::NotFound("Product")),
    };

    let active = WishlistActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product.id),
        created_at: NotSet,
    };

    let item = match active.insert(&state.orm).await {
        Ok(item) => item,
        Err(err) => {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                let existing = WishlistItems::find()
                    .filter(
                        Condition::all()
                            .add(WishlistCol::UserId.eq(user.user_id))
                            .add(WishlistCol::ProductId.eq(product.id)),
                    )
                    .one(&state.orm)
                    .await?;
                match existing {
                    Some(item) => item,
                    None => return Err(err.into()),
                }
            } else {
                return Err(err.into());
            }
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "wishlist_add",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to wishlist",
        item.into(),
        Some(Meta::empty()),
    ))
}

pub async fn remove_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = WishlistItems::delete_many()
        .filter(
            Condition::all()
                .add(WishlistCol::UserId.eq(user.user_id))
                .add(WishlistCol::ProductId.eq(product_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Wishlist item"));
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "wishlist_remove",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
