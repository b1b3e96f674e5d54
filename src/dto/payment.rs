use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGatewayOrderRequest {
    pub order_id: Uuid,
}

/// What the storefront needs to open the gateway checkout widget.
#[derive(Debug, Serialize, ToSchema)]
pub struct GatewayOrderData {
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub order_id: Uuid,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentVerified {
    pub order_id: Uuid,
    pub payment_status: String,
    pub status: String,
}
