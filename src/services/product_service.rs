use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::catalog::{
        CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest, VariationInput,
    },
    entity::{
        brands::{Column as BrandCol, Entity as Brands},
        categories::{Column as CategoryCol, Entity as Categories},
        products::{ActiveModel as ProductActive, Column, Entity as Products},
        variations::{ActiveModel as VariationActive, Column as VarCol, Entity as Variations},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Product, Variation},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSort},
    slug::slugify,
    state::AppState,
};

const FLAGGED_LIST_CAP: u64 = 12;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    list_products_inner(state, query, true).await
}

/// Admin listing; inactive products included.
pub async fn list_products_admin(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    list_products_inner(state, query, false).await
}

async fn list_products_inner(
    state: &AppState,
    query: ProductQuery,
    only_active: bool,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if only_active {
        condition = condition.add(Column::Active.eq(true));
    }

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(raw) = query.categories.as_ref().filter(|s| !s.is_empty()) {
        let ids = resolve_category_ids(state, raw).await?;
        if ids.is_empty() {
            let meta = Meta::new(page, limit, 0);
            return Ok(ApiResponse::success(
                "Products",
                ProductList { items: Vec::new() },
                Some(meta),
            ));
        }
        condition = condition.add(Column::CategoryId.is_in(ids));
    }

    if let Some(raw) = query.brands.as_ref().filter(|s| !s.is_empty()) {
        let ids = resolve_brand_ids(state, raw).await?;
        if ids.is_empty() {
            let meta = Meta::new(page, limit, 0);
            return Ok(ApiResponse::success(
                "Products",
                ProductList { items: Vec::new() },
                Some(meta),
            ));
        }
        condition = condition.add(Column::BrandId.is_in(ids));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let finder = Products::find().filter(condition);
    let finder = match query.sort.unwrap_or(ProductSort::Newest) {
        ProductSort::Newest => finder.order_by_desc(Column::CreatedAt),
        ProductSort::PriceLow => finder.order_by_asc(Column::Price),
        ProductSort::PriceHigh => finder.order_by_desc(Column::Price),
        ProductSort::Alphabetical => finder.order_by_asc(Column::Name),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

/// Detail lookup by id or slug; inactive products are invisible here.
pub async fn get_product(
    state: &AppState,
    id_or_slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let found = match Uuid::parse_str(id_or_slug) {
        Ok(id) => Products::find_by_id(id).one(&state.orm).await?,
        Err(_) => {
            Products::find()
                .filter(Column::Slug.eq(id_or_slug))
                .one(&state.orm)
                .await?
        }
    };
    let product = match found {
        Some(p) if p.active => p,
        _ => return Err(AppError::NotFound("Product")),
    };

    let variations = load_variations(&state.orm, product.id).await?;

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product: product.into(),
            variations,
        },
        None,
    ))
}

pub async fn featured_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    flagged_products(state, Column::Featured).await
}

pub async fn trending_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    flagged_products(state, Column::Trending).await
}

async fn flagged_products(state: &AppState, flag: Column) -> AppResult<ApiResponse<ProductList>> {
    let items = Products::find()
        .filter(Condition::all().add(Column::Active.eq(true)).add(flag.eq(true)))
        .order_by_desc(Column::CreatedAt)
        .limit(FLAGGED_LIST_CAP)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    if payload.price <= Decimal::ZERO {
        return Err(AppError::BadRequest("Price must be positive".into()));
    }
    if payload.stock < 0 {
        return Err(AppError::BadRequest("Stock cannot be negative".into()));
    }

    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(&payload.name),
    };
    let images = serde_json::json!(payload.images.unwrap_or_default());

    let txn = state.orm.begin().await?;

    let active = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        slug: Set(slug),
        description: Set(payload.description),
        price: Set(payload.price),
        discount_price: Set(payload.discount_price),
        discount_percent: Set(payload.discount_percent),
        stock: Set(payload.stock),
        category_id: Set(payload.category_id),
        subcategory_id: Set(payload.subcategory_id),
        brand_id: Set(payload.brand_id),
        images: Set(images),
        video: Set(payload.video),
        featured: Set(payload.featured.unwrap_or(false)),
        trending: Set(payload.trending.unwrap_or(false)),
        active: Set(payload.active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    };

    let product = match active.insert(&txn).await {
        Ok(p) => p,
        Err(err) => {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return Err(AppError::BadRequest("Product slug already exists".into()));
            }
            return Err(err.into());
        }
    };

    let variations = match payload.variations {
        Some(inputs) => insert_variations(&txn, product.id, inputs).await?,
        None => Vec::new(),
    };

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        ProductDetail {
            product: product.into(),
            variations,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound("Product")),
    };

    if let Some(price) = payload.price {
        if price <= Decimal::ZERO {
            return Err(AppError::BadRequest("Price must be positive".into()));
        }
    }
    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(AppError::BadRequest("Stock cannot be negative".into()));
        }
    }

    let txn = state.orm.begin().await?;

    let mut active: ProductActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(discount_price) = payload.discount_price {
        active.discount_price = Set(Some(discount_price));
    }
    if let Some(discount_percent) = payload.discount_percent {
        active.discount_percent = Set(Some(discount_percent));
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(subcategory_id) = payload.subcategory_id {
        active.subcategory_id = Set(Some(subcategory_id));
    }
    if let Some(brand_id) = payload.brand_id {
        active.brand_id = Set(Some(brand_id));
    }
    if let Some(images) = payload.images {
        active.images = Set(serde_json::json!(images));
    }
    if let Some(video) = payload.video {
        active.video = Set(Some(video));
    }
    if let Some(featured) = payload.featured {
        active.featured = Set(featured);
    }
    if let Some(trending) = payload.trending {
        active.trending = Set(trending);
    }
    if let Some(is_active) = payload.active {
        active.active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&txn).await?;

    let variations = match payload.variations {
        Some(inputs) => {
            Variations::delete_many()
                .filter(VarCol::ProductId.eq(product.id))
                .exec(&txn)
                .await?;
            insert_variations(&txn, product.id, inputs).await?
        }
        None => load_variations(&txn, product.id).await?,
    };

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        ProductDetail {
            product: product.into(),
            variations,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product"));
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
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

async fn insert_variations<C>(
    conn: &C,
    product_id: Uuid,
    inputs: Vec<VariationInput>,
) -> AppResult<Vec<Variation>>
where
    C: ConnectionTrait,
{
    let mut variations = Vec::with_capacity(inputs.len());
    for input in inputs {
        if input.price <= Decimal::ZERO {
            return Err(AppError::BadRequest("Variation price must be positive".into()));
        }
        if input.stock < 0 {
            return Err(AppError::BadRequest("Variation stock cannot be negative".into()));
        }
        let variation = VariationActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            color: Set(input.color),
            size: Set(input.size),
            price: Set(input.price),
            stock: Set(input.stock),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
        variations.push(variation.into());
    }
    Ok(variations)
}

async fn load_variations<C>(conn: &C, product_id: Uuid) -> AppResult<Vec<Variation>>
where
    C: ConnectionTrait,
{
    let variations = Variations::find()
        .filter(VarCol::ProductId.eq(product_id))
        .order_by_asc(VarCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Variation::from)
        .collect();
    Ok(variations)
}

/// Filter values may be slugs or raw uuids; both resolve to category ids.
async fn resolve_category_ids(state: &AppState, raw: &str) -> AppResult<Vec<Uuid>> {
    let (mut ids, slugs) = split_filter_tokens(raw);
    if !slugs.is_empty() {
        let found = Categories::find()
            .filter(CategoryCol::Slug.is_in(slugs))
            .all(&state.orm)
            .await?;
        ids.extend(found.into_iter().map(|c| c.id));
    }
    Ok(ids)
}

async fn resolve_brand_ids(state: &AppState, raw: &str) -> AppResult<Vec<Uuid>> {
    let (mut ids, slugs) = split_filter_tokens(raw);
    if !slugs.is_empty() {
        let found = Brands::find()
            .filter(BrandCol::Slug.is_in(slugs))
            .all(&state.orm)
            .await?;
        ids.extend(found.into_iter().map(|b| b.id));
    }
    Ok(ids)
}

fn split_filter_tokens(raw: &str) -> (Vec<Uuid>, Vec<String>) {
    let mut ids = Vec::new();
    let mut slugs = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match Uuid::parse_str(token) {
            Ok(id) => ids.push(id),
            Err(_) => slugs.push(token.to_string()),
        }
    }
    (ids, slugs)
}
