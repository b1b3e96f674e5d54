use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::catalog::{
        CategoryList, CategoryWithSubcategories, CreateCategoryRequest, CreateSubcategoryRequest,
        SubcategoryList, UpdateCategoryRequest, UpdateSubcategoryRequest,
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        subcategories::{
            ActiveModel as SubcategoryActive, Column as SubCol, Entity as Subcategories,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Subcategory},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    slug::slugify,
    state::AppState,
};

/// Public category tree: active categories, each with its active
/// subcategories.
pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let categories = Categories::find()
        .filter(CategoryCol::Active.eq(true))
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut grouped: HashMap<Uuid, Vec<Subcategory>> = HashMap::new();
    if !ids.is_empty() {
        let subcategories = Subcategories::find()
            .filter(SubCol::CategoryId.is_in(ids))
            .filter(SubCol::Active.eq(true))
            .order_by_asc(SubCol::Name)
            .all(&state.orm)
            .await?;
        for sub in subcategories {
            grouped
                .entry(sub.category_id)
                .or_default()
                .push(sub.into());
        }
    }

    let items = categories
        .into_iter()
        .map(|category| {
            let subs = grouped.remove(&category.id).unwrap_or_default();
            CategoryWithSubcategories::new(category.into(), subs)
        })
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

/// Admin listing; inactive rows included.
pub async fn list_categories_admin(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CategoryList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Categories::find().order_by_asc(CategoryCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let categories = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut grouped: HashMap<Uuid, Vec<Subcategory>> = HashMap::new();
    if !ids.is_empty() {
        let subcategories = Subcategories::find()
            .filter(SubCol::CategoryId.is_in(ids))
            .order_by_asc(SubCol::Name)
            .all(&state.orm)
            .await?;
        for sub in subcategories {
            grouped
                .entry(sub.category_id)
                .or_default()
                .push(sub.into());
        }
    }

    let items = categories
        .into_iter()
        .map(|category| {
            let subs = grouped.remove(&category.id).unwrap_or_default();
            CategoryWithSubcategories::new(category.into(), subs)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(&payload.name),
    };

    let active = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        slug: Set(slug),
        image: Set(payload.image),
        active: Set(payload.active.unwrap_or(true)),
        created_at: NotSet,
    };

    let category = match active.insert(&state.orm).await {
        Ok(c) => c,
        Err(err) => {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return Err(AppError::BadRequest("Category slug already exists".into()));
            }
            return Err(err.into());
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category created",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound("Category")),
    };

    let mut active: CategoryActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(enabled) = payload.active {
        active.active = Set(enabled);
    }

    let category = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category updated",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Category"));
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
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

pub async fn list_subcategories_admin(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<SubcategoryList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Subcategories::find().order_by_asc(SubCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Subcategory::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Subcategories",
        SubcategoryList { items },
        Some(meta),
    ))
}

pub async fn create_subcategory(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSubcategoryRequest,
) -> AppResult<ApiResponse<Subcategory>> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }

    let parent = Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?;
    if parent.is_none() {
        return Err(AppError::NotFound("Category"));
    }

    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(&payload.name),
    };

    let active = SubcategoryActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        name: Set(payload.name),
        slug: Set(slug),
        active: Set(payload.active.unwrap_or(true)),
        created_at: NotSet,
    };

    let subcategory = match active.insert(&state.orm).await {
        Ok(s) => s,
        Err(err) => {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return Err(AppError::BadRequest(
                    "Subcategory slug already exists".into(),
                ));
            }
            return Err(err.into());
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "subcategory_create",
        Some("subcategories"),
        Some(serde_json::json!({ "subcategory_id": subcategory.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Subcategory created",
        subcategory.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_subcategory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSubcategoryRequest,
) -> AppResult<ApiResponse<Subcategory>> {
    ensure_admin(user)?;
    let existing = Subcategories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(s) => s,
        None => return Err(AppError::NotFound("Subcategory")),
    };

    let mut active: SubcategoryActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(enabled) = payload.active {
        active.active = Set(enabled);
    }

    let subcategory = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "subcategory_update",
        Some("subcategories"),
        Some(serde_json::json!({ "subcategory_id": subcategory.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Subcategory updated",
        subcategory.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_subcategory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Subcategories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Subcategory"));
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "subcategory_delete",
        Some("subcategories"),
        Some(serde_json::json!({ "subcategory_id": id })),
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
