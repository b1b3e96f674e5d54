use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::sea_query::LockType;

use crate::{
    audit::log_audit,
    dto::payment::{
        CreateGatewayOrderRequest, GatewayOrderData, PaymentVerified, VerifyPaymentRequest,
    },
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    payment,
    response::{ApiResponse, Meta},
    state::AppState,
};

const GATEWAY_CURRENCY: &str = "INR";

/// Creates the gateway-side order for an unpaid order, converting the stored
/// total to minor units. The amount never comes from the client.
pub async fn create_gateway_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateGatewayOrderRequest,
) -> AppResult<ApiResponse<GatewayOrderData>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(payload.order_id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound("Order")),
    };

    if order.payment_status == "paid" {
        return Err(AppError::BadRequest("Order already paid".into()));
    }

    let amount = payment::to_minor_units(order.total)?;
    let receipt = order.id.to_string();
    let gateway_order = state
        .gateway
        .create_order(amount, GATEWAY_CURRENCY, &receipt)
        .await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "payment_order_create",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "gateway_order_id": gateway_order.id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Gateway order created",
        GatewayOrderData {
            gateway_order_id: gateway_order.id,
            amount: gateway_order.amount,
            currency: gateway_order.currency,
            key_id: state.gateway.key_id().to_string(),
        },
        Some(Meta::empty()),
    ))
}

/// Verifies the gateway callback signature. A match marks the order paid and
/// moves it to processing; a mismatch marks the payment failed and rejects.
pub async fn verify_payment(
    state: &AppState,
    user: &AuthUser,
    payload: VerifyPaymentRequest,
) -> AppResult<ApiResponse<PaymentVerified>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(payload.order_id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound("Order")),
    };

    if order.payment_status == "paid" {
        return Err(AppError::BadRequest("Order already paid".into()));
    }

    let valid = payment::verify_payment_signature(
        &state.config.gateway_key_secret,
        &payload.gateway_order_id,
        &payload.gateway_payment_id,
        &payload.signature,
    )?;

    let order_id = order.id;
    let mut active: OrderActive = order.into();
    active.updated_at = Set(Utc::now().into());

    if !valid {
        active.payment_status = Set("failed".into());
        active.update(&txn).await?;
        txn.commit().await?;

        if let Err(err) = log_audit(
            &state.orm,
            Some(user.user_id),
            "payment_failed",
            Some("orders"),
            Some(serde_json::json!({ "order_id": order_id })),
        )
        .await
        {
            tracing::warn!(error = %err, "audit log failed");
        }

        return Err(AppError::BadRequest("Payment signature mismatch".into()));
    }

    active.payment_id = Set(Some(payload.gateway_payment_id.clone()));
    active.payment_status = Set("paid".into());
    active.status = Set("processing".into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "payment_verified",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "gateway_payment_id": payload.gateway_payment_id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment verified",
        PaymentVerified {
            order_id: order.id,
            payment_status: order.payment_status,
            status: order.status,
        },
        Some(Meta::empty()),
    ))
}
