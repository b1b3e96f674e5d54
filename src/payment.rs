use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use utoipa::ToSchema;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    pricing::round_money,
};

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 over `"{gateway_order_id}|{gateway_payment_id}"`, the
/// signature contract of the payment gateway callback.
pub fn payment_signature(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid HMAC key: {e}")))?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a client-supplied hex signature. Malformed hex is
/// treated as a mismatch, not an error.
pub fn verify_payment_signature(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
) -> AppResult<bool> {
    let supplied = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid HMAC key: {e}")))?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());
    Ok(mac.verify_slice(&supplied).is_ok())
}

/// Convert a money amount to gateway minor units (paise), e.g. 499.50 -> 49950.
pub fn to_minor_units(amount: Decimal) -> AppResult<i64> {
    (round_money(amount) * Decimal::from(100))
        .to_i64()
        .ok_or_else(|| AppError::BadRequest("Amount out of range".into()))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

/// Thin REST client for the payment gateway's order endpoint. Only the order
/// call and the signature contract are modeled; the provider SDK stays an
/// external collaborator.
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl GatewayClient {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.gateway_base_url.trim_end_matches('/').to_string(),
            key_id: config.gateway_key_id.clone(),
            key_secret: config.gateway_key_secret.clone(),
        }
    }

    /// Public key id the storefront embeds in the checkout widget.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> AppResult<GatewayOrder> {
        let url = format!("{}/orders", self.base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_minor,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("payment gateway unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "payment gateway returned {}",
                response.status()
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid gateway response: {e}")))
    }
}
