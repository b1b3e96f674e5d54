use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::content::{
        BannerList, CreateBannerRequest, CreatePageRequest, PageList, UpdateBannerRequest,
        UpdatePageRequest, UpdateSettingsRequest,
    },
    entity::{
        banners::{ActiveModel as BannerActive, Column as BannerCol, Entity as Banners},
        pages::{ActiveModel as PageActive, Column as PageCol, Entity as Pages},
        settings::{ActiveModel as SettingsActive, Entity as SettingsEntity},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Banner, Page, Settings},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    slug::slugify,
    state::AppState,
};

pub async fn list_banners(
    state: &AppState,
    placement: Option<String>,
) -> AppResult<ApiResponse<BannerList>> {
    let mut finder = Banners::find().filter(BannerCol::Active.eq(true));
    if let Some(key) = placement.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        finder = finder.filter(BannerCol::Page.eq(key));
    }

    let items = finder
        .order_by_desc(BannerCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Banner::from)
        .collect();

    Ok(ApiResponse::success(
        "Banners",
        BannerList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_banners_admin(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<BannerList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Banners::find().order_by_desc(BannerCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Banner::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Banners",
        BannerList { items },
        Some(meta),
    ))
}

pub async fn create_banner(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBannerRequest,
) -> AppResult<ApiResponse<Banner>> {
    ensure_admin(user)?;
    if payload.page.trim().is_empty() {
        return Err(AppError::BadRequest("Placement page is required".into()));
    }
    if payload.image.trim().is_empty() {
        return Err(AppError::BadRequest("Image is required".into()));
    }

    let banner = BannerActive {
        id: Set(Uuid::new_v4()),
        page: Set(payload.page.trim().to_string()),
        image: Set(payload.image),
        title: Set(payload.title),
        link: Set(payload.link),
        active: Set(payload.active.unwrap_or(true)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "banner_create",
        Some("banners"),
        Some(serde_json::json!({ "banner_id": banner.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Banner created",
        banner.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_banner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBannerRequest,
) -> AppResult<ApiResponse<Banner>> {
    ensure_admin(user)?;
    let existing = Banners::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(b) => b,
        None => return Err(AppError::NotFound("Banner")),
    };

    let mut active: BannerActive = existing.into();
    if let Some(page) = payload.page {
        active.page = Set(page);
    }
    if let Some(image) = payload.image {
        active.image = Set(image);
    }
    if let Some(title) = payload.title {
        active.title = Set(Some(title));
    }
    if let Some(link) = payload.link {
        active.link = Set(Some(link));
    }
    if let Some(enabled) = payload.active {
        active.active = Set(enabled);
    }

    let banner = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "banner_update",
        Some("banners"),
        Some(serde_json::json!({ "banner_id": banner.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Banner updated",
        banner.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_banner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Banners::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Banner"));
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "banner_delete",
        Some("banners"),
        Some(serde_json::json!({ "banner_id": id })),
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

/// Public page fetch by slug; drafts and disabled pages are invisible.
pub async fn get_page(state: &AppState, slug: &str) -> AppResult<ApiResponse<Page>> {
    let page = Pages::find()
        .filter(PageCol::Slug.eq(slug))
        .filter(PageCol::Active.eq(true))
        .one(&state.orm)
        .await?;
    match page {
        Some(p) => Ok(ApiResponse::success("Page", p.into(), None)),
        None => Err(AppError::NotFound("Page")),
    }
}

pub async fn list_pages_admin(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<PageList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Pages::find().order_by_asc(PageCol::Title);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Page::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Pages", PageList { items }, Some(meta)))
}

pub async fn create_page(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePageRequest,
) -> AppResult<ApiResponse<Page>> {
    ensure_admin(user)?;
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".into()));
    }
    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(&payload.title),
    };

    let active = PageActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        slug: Set(slug),
        content: Set(payload.content),
        active: Set(payload.active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    };

    let page = match active.insert(&state.orm).await {
        Ok(p) => p,
        Err(err) => {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return Err(AppError::BadRequest("Page slug already exists".into()));
            }
            return Err(err.into());
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "page_create",
        Some("pages"),
        Some(serde_json::json!({ "page_id": page.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Page created",
        page.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_page(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePageRequest,
) -> AppResult<ApiResponse<Page>> {
    ensure_admin(user)?;
    let existing = Pages::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound("Page")),
    };

    let mut active: PageActive = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(enabled) = payload.active {
        active.active = Set(enabled);
    }
    active.updated_at = Set(Utc::now().into());

    let page = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "page_update",
        Some("pages"),
        Some(serde_json::json!({ "page_id": page.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Page updated",
        page.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_page(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Pages::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Page"));
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "page_delete",
        Some("pages"),
        Some(serde_json::json!({ "page_id": id })),
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

/// Site settings are a single fixed-id row; reads fall back to defaults so a
/// fresh install works before anything is saved.
pub async fn get_settings(state: &AppState) -> AppResult<ApiResponse<Settings>> {
    let settings = SettingsEntity::find_by_id(Uuid::nil())
        .one(&state.orm)
        .await?
        .map(Settings::from)
        .unwrap_or_default();
    Ok(ApiResponse::success("Settings", settings, None))
}

pub async fn update_settings(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateSettingsRequest,
) -> AppResult<ApiResponse<Settings>> {
    ensure_admin(user)?;
    let existing = SettingsEntity::find_by_id(Uuid::nil()).one(&state.orm).await?;

    let settings = match existing {
        Some(row) => {
            let mut active: SettingsActive = row.into();
            if let Some(site_name) = payload.site_name {
                active.site_name = Set(site_name);
            }
            if let Some(contact_email) = payload.contact_email {
                active.contact_email = Set(contact_email);
            }
            if let Some(contact_phone) = payload.contact_phone {
                active.contact_phone = Set(contact_phone);
            }
            if let Some(address) = payload.address {
                active.address = Set(address);
            }
            if let Some(facebook) = payload.facebook {
                active.facebook = Set(Some(facebook));
            }
            if let Some(instagram) = payload.instagram {
                active.instagram = Set(Some(instagram));
            }
            if let Some(twitter) = payload.twitter {
                active.twitter = Set(Some(twitter));
            }
            if let Some(youtube) = payload.youtube {
                active.youtube = Set(Some(youtube));
            }
            if let Some(logo) = payload.logo {
                active.logo = Set(Some(logo));
            }
            if let Some(favicon) = payload.favicon {
                active.favicon = Set(Some(favicon));
            }
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => {
            let defaults = Settings::default();
            SettingsActive {
                id: Set(Uuid::nil()),
                site_name: Set(payload.site_name.unwrap_or(defaults.site_name)),
                contact_email: Set(payload.contact_email.unwrap_or(defaults.contact_email)),
                contact_phone: Set(payload.contact_phone.unwrap_or(defaults.contact_phone)),
                address: Set(payload.address.unwrap_or(defaults.address)),
                facebook: Set(payload.facebook),
                instagram: Set(payload.instagram),
                twitter: Set(payload.twitter),
                youtube: Set(payload.youtube),
                logo: Set(payload.logo),
                favicon: Set(payload.favicon),
                updated_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await?
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "settings_update",
        Some("settings"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Settings updated",
        settings.into(),
        Some(Meta::empty()),
    ))
}
