use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub frontend_base_url: String,
    pub shipping_flat_fee: Decimal,
    pub free_shipping_threshold: Decimal,
    pub gateway_base_url: String,
    pub gateway_key_id: String,
    pub gateway_key_secret: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let frontend_base_url =
            env::var("FRONTEND_BASE_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let shipping_flat_fee = decimal_env("SHIPPING_FLAT_FEE", Decimal::from(60));
        let free_shipping_threshold = decimal_env("FREE_SHIPPING_THRESHOLD", Decimal::from(999));
        let gateway_base_url = env::var("PAYMENT_GATEWAY_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string());
        let gateway_key_id = env::var("PAYMENT_GATEWAY_KEY").unwrap_or_default();
        let gateway_key_secret = env::var("PAYMENT_GATEWAY_SECRET").unwrap_or_default();
        let smtp_host = env::var("SMTP_HOST").ok().filter(|h| !h.is_empty());
        let smtp_port = env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(587);
        let smtp_username = env::var("SMTP_USERNAME").ok();
        let smtp_password = env::var("SMTP_PASSWORD").ok();
        let smtp_from = env::var("SMTP_FROM").unwrap_or_else(|_| "store@localhost".to_string());

        Ok(Self {
            database_url,
            host,
            port,
            environment,
            frontend_base_url,
            shipping_flat_fee,
            free_shipping_threshold,
            gateway_base_url,
            gateway_key_id,
            gateway_key_secret,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_from,
        })
    }
}

fn decimal_env(key: &str, default: Decimal) -> Decimal {
    env::var(key)
        .ok()
        .and_then(|v| Decimal::from_str(&v).ok())
        .unwrap_or(default)
}
