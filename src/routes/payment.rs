use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payment::{
        CreateGatewayOrderRequest, GatewayOrderData, PaymentVerified, VerifyPaymentRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order", post(create_gateway_order))
        .route("/verify", post(verify_payment))
}

#[utoipa::path(
    post,
    path = "/api/payment/order",
    request_body = CreateGatewayOrderRequest,
    responses(
        (status = 200, description = "Gateway order created", body = ApiResponse<GatewayOrderData>),
        (status = 400, description = "Order already paid"),
        (status = 404, description = "Order not found"),
        (status = 502, description = "Gateway unreachable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn create_gateway_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateGatewayOrderRequest>,
) -> AppResult<Json<ApiResponse<GatewayOrderData>>> {
    let resp = payment_service::create_gateway_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payment/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Signature verified, order marked paid", body = ApiResponse<PaymentVerified>),
        (status = 400, description = "Signature mismatch or order already paid"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentVerified>>> {
    let resp = payment_service::verify_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}
