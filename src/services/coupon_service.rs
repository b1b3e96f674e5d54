use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::coupons::{
        AppliedCoupon, ApplyCouponRequest, CouponList, CouponSummary, CreateCouponRequest,
        UpdateCouponRequest,
    },
    entity::coupons::{
        ActiveModel as CouponActive, Column as CouponCol, Entity as Coupons, Model as CouponModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    pricing::{self, CouponKind, CouponRule},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::cart_service::{self, ResolvedLine},
    state::AppState,
};

/// Looks up an active coupon by its normalized code and checks expiry and the
/// usage limit. Shared by cart quoting, coupon apply, and order placement;
/// placement passes its transaction and `lock` so the usage count stays
/// consistent under concurrent checkouts.
pub async fn find_valid_coupon<C>(conn: &C, code: &str, lock: bool) -> AppResult<CouponModel>
where
    C: ConnectionTrait,
{
    let normalized = code.trim().to_uppercase();
    let mut query = Coupons::find().filter(CouponCol::Code.eq(normalized));
    if lock {
        query = query.lock(LockType::Update);
    }
    let coupon = query.one(conn).await?;
    let coupon = match coupon {
        Some(c) if c.active => c,
        _ => return Err(AppError::NotFound("Coupon")),
    };

    if coupon.expires_at < Utc::now() {
        return Err(AppError::BadRequest("Coupon has expired".into()));
    }
    if let Some(limit) = coupon.usage_limit {
        if coupon.used_count >= limit {
            return Err(AppError::BadRequest("Coupon usage limit reached".into()));
        }
    }

    Ok(coupon)
}

pub fn rule_for(coupon: &CouponModel) -> AppResult<CouponRule> {
    let kind = CouponKind::parse(&coupon.kind).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unknown coupon kind: {}", coupon.kind))
    })?;
    Ok(CouponRule {
        kind,
        value: coupon.value,
        category_id: coupon.category_id,
        product_id: coupon.product_id,
    })
}

pub async fn apply_coupon(
    state: &AppState,
    payload: ApplyCouponRequest,
) -> AppResult<ApiResponse<AppliedCoupon>> {
    let coupon = find_valid_coupon(&state.orm, &payload.code, false).await?;
    let rule = rule_for(&coupon)?;

    let resolved = cart_service::resolve_lines(&state.orm, &payload.items, false).await?;
    let lines: Vec<_> = resolved.iter().map(ResolvedLine::pricing_line).collect();
    let discount = pricing::coupon_discount(&lines, &rule);

    Ok(ApiResponse::success(
        "Coupon applied",
        AppliedCoupon {
            coupon: CouponSummary::from(&coupon),
            discount,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_coupons(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Coupons::find().order_by_desc(CouponCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Coupon::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Coupons",
        CouponList { items },
        Some(meta),
    ))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let kind = parse_kind(&payload.kind)?;
    validate_value(kind, payload.value)?;

    let code = payload.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(AppError::BadRequest("Coupon code is required".into()));
    }

    let active = CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        kind: Set(kind.as_str().to_string()),
        value: Set(payload.value),
        expires_at: Set(payload.expires_at.into()),
        active: Set(payload.active.unwrap_or(true)),
        category_id: Set(payload.category_id),
        product_id: Set(payload.product_id),
        used_count: Set(0),
        usage_limit: Set(payload.usage_limit),
        created_at: NotSet,
    };

    let coupon = match active.insert(&state.orm).await {
        Ok(c) => c,
        Err(err) => {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return Err(AppError::BadRequest("Coupon code already exists".into()));
            }
            return Err(err.into());
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "coupon_create",
        Some("coupons"),
        Some(serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Coupon created",
        coupon.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let existing = Coupons::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound("Coupon")),
    };

    let kind = match payload.kind.as_deref() {
        Some(raw) => parse_kind(raw)?,
        None => parse_kind(&existing.kind)?,
    };
    let value = payload.value.unwrap_or(existing.value);
    validate_value(kind, value)?;

    let mut active: CouponActive = existing.into();
    active.kind = Set(kind.as_str().to_string());
    active.value = Set(value);
    if let Some(expires_at) = payload.expires_at {
        active.expires_at = Set(expires_at.into());
    }
    if let Some(enabled) = payload.active {
        active.active = Set(enabled);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(product_id) = payload.product_id {
        active.product_id = Set(Some(product_id));
    }
    if let Some(usage_limit) = payload.usage_limit {
        active.usage_limit = Set(Some(usage_limit));
    }

    let coupon = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "coupon_update",
        Some("coupons"),
        Some(serde_json::json!({ "coupon_id": coupon.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Coupon updated",
        coupon.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Coupons::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Coupon"));
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "coupon_delete",
        Some("coupons"),
        Some(serde_json::json!({ "coupon_id": id })),
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

fn parse_kind(raw: &str) -> Result<CouponKind, AppError> {
    CouponKind::parse(raw).ok_or_else(|| AppError::BadRequest("Invalid coupon kind".into()))
}

fn validate_value(kind: CouponKind, value: Decimal) -> Result<(), AppError> {
    if value <= Decimal::ZERO {
        return Err(AppError::BadRequest("Coupon value must be positive".into()));
    }
    if kind == CouponKind::Percentage && value > Decimal::from(100) {
        return Err(AppError::BadRequest(
            "Percentage coupon cannot exceed 100".into(),
        ));
    }
    Ok(())
}
