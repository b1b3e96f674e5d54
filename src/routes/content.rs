use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::content::{
        BannerList, CreateBannerRequest, CreatePageRequest, PageList, UpdateBannerRequest,
        UpdatePageRequest, UpdateSettingsRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Banner, Page, Settings},
    response::ApiResponse,
    routes::params::{BannerQuery, Pagination},
    services::content_service,
    state::AppState,
};

// Public storefront content lives under three prefixes, so this router is
// merged rather than nested.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/banners", get(list_banners))
        .route("/pages/{slug}", get(get_page))
        .route("/settings", get(get_settings))
}

pub fn admin_banner_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_banners_admin))
        .route("/", post(create_banner))
        .route("/{id}", put(update_banner))
        .route("/{id}", delete(delete_banner))
}

pub fn admin_page_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pages_admin))
        .route("/", post(create_page))
        .route("/{id}", put(update_page))
        .route("/{id}", delete(delete_page))
}

#[utoipa::path(
    get,
    path = "/api/banners",
    params(
        ("page" = Option<String>, Query, description = "Placement key, e.g. home"),
    ),
    responses(
        (status = 200, description = "Active banners", body = ApiResponse<BannerList>)
    ),
    tag = "Content"
)]
pub async fn list_banners(
    State(state): State<AppState>,
    Query(query): Query<BannerQuery>,
) -> AppResult<Json<ApiResponse<BannerList>>> {
    let resp = content_service::list_banners(&state, query.page).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pages/{slug}",
    params(
        ("slug" = String, Path, description = "Page slug")
    ),
    responses(
        (status = 200, description = "Published page", body = ApiResponse<Page>),
        (status = 404, description = "Page not found"),
    ),
    tag = "Content"
)]
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<Page>>> {
    let resp = content_service::get_page(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Store settings", body = ApiResponse<Settings>)
    ),
    tag = "Content"
)]
pub async fn get_settings(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Settings>>> {
    let resp = content_service::get_settings(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/banners",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List all banners", body = ApiResponse<BannerList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_banners_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<BannerList>>> {
    let resp = content_service::list_banners_admin(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/banners",
    request_body = CreateBannerRequest,
    responses(
        (status = 200, description = "Create banner", body = ApiResponse<Banner>),
        (status = 400, description = "Missing page or image"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_banner(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBannerRequest>,
) -> AppResult<Json<ApiResponse<Banner>>> {
    let resp = content_service::create_banner(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/banners/{id}",
    params(
        ("id" = Uuid, Path, description = "Banner ID")
    ),
    request_body = UpdateBannerRequest,
    responses(
        (status = 200, description = "Update banner", body = ApiResponse<Banner>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Banner not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_banner(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBannerRequest>,
) -> AppResult<Json<ApiResponse<Banner>>> {
    let resp = content_service::update_banner(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/banners/{id}",
    params(
        ("id" = Uuid, Path, description = "Banner ID")
    ),
    responses(
        (status = 200, description = "Delete banner"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Banner not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_banner(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = content_service::delete_banner(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/pages",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List all pages", body = ApiResponse<PageList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_pages_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PageList>>> {
    let resp = content_service::list_pages_admin(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/pages",
    request_body = CreatePageRequest,
    responses(
        (status = 200, description = "Create page", body = ApiResponse<Page>),
        (status = 400, description = "Duplicate slug"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_page(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePageRequest>,
) -> AppResult<Json<ApiResponse<Page>>> {
    let resp = content_service::create_page(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/pages/{id}",
    params(
        ("id" = Uuid, Path, description = "Page ID")
    ),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Update page", body = ApiResponse<Page>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Page not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePageRequest>,
) -> AppResult<Json<ApiResponse<Page>>> {
    let resp = content_service::update_page(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/pages/{id}",
    params(
        ("id" = Uuid, Path, description = "Page ID")
    ),
    responses(
        (status = 200, description = "Delete page"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Page not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_page(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = content_service::delete_page(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Update store settings", body = ApiResponse<Settings>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateSettingsRequest>,
) -> AppResult<Json<ApiResponse<Settings>>> {
    let resp = content_service::update_settings(&state, &user, payload).await?;
    Ok(Json(resp))
}
