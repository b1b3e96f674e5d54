use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::catalog::{BrandList, CreateBrandRequest, UpdateBrandRequest},
    entity::brands::{ActiveModel as BrandActive, Column as BrandCol, Entity as Brands},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Brand,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    slug::slugify,
    state::AppState,
};

pub async fn list_brands(state: &AppState) -> AppResult<ApiResponse<BrandList>> {
    let items = Brands::find()
        .filter(BrandCol::Active.eq(true))
        .order_by_asc(BrandCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Brand::from)
        .collect();

    Ok(ApiResponse::success(
        "Brands",
        BrandList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_brands_admin(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<BrandList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Brands::find().order_by_asc(BrandCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Brand::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Brands", BrandList { items }, Some(meta)))
}

pub async fn create_brand(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBrandRequest,
) -> AppResult<ApiResponse<Brand>> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(&payload.name),
    };

    let active = BrandActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        slug: Set(slug),
        logo: Set(payload.logo),
        active: Set(payload.active.unwrap_or(true)),
        created_at: NotSet,
    };

    let brand = match active.insert(&state.orm).await {
        Ok(b) => b,
        Err(err) => {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return Err(AppError::BadRequest("Brand slug already exists".into()));
            }
            return Err(err.into());
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "brand_create",
        Some("brands"),
        Some(serde_json::json!({ "brand_id": brand.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Brand created",
        brand.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_brand(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBrandRequest,
) -> AppResult<ApiResponse<Brand>> {
    ensure_admin(user)?;
    let existing = Brands::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(b) => b,
        None => return Err(AppError::NotFound("Brand")),
    };

    let mut active: BrandActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(logo) = payload.logo {
        active.logo = Set(Some(logo));
    }
    if let Some(enabled) = payload.active {
        active.active = Set(enabled);
    }

    let brand = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "brand_update",
        Some("brands"),
        Some(serde_json::json!({ "brand_id": brand.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Brand updated",
        brand.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_brand(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Brands::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Brand"));
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "brand_delete",
        Some("brands"),
        Some(serde_json::json!({ "brand_id": id })),
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
