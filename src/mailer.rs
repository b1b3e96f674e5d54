use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};

use crate::{config::AppConfig, models::Order};

/// SMTP mailer for transactional mail. Runs disabled when no SMTP host is
/// configured; sends then become no-ops.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl Mailer {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let Some(host) = config.smtp_host.as_deref() else {
            return Ok(Self::disabled());
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| anyhow::anyhow!("invalid SMTP relay {host}: {e}"))?
            .port(config.smtp_port);
        if let (Some(username), Some(password)) =
            (config.smtp_username.clone(), config.smtp_password.clone())
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: Some(builder.build()),
            from: config.smtp_from.clone(),
        })
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: "store@localhost".to_string(),
        }
    }

    /// Order confirmation mail. Callers treat failure as best-effort: log and
    /// move on, the order is already committed.
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order: &Order,
        item_lines: &[String],
    ) -> anyhow::Result<()> {
        let Some(transport) = &self.transport else {
            tracing::debug!(order_id = %order.id, "mailer disabled, skipping confirmation");
            return Ok(());
        };

        let body = format!(
            "Thank you for your order!\n\n\
             Order: {}\n\
             Items:\n{}\n\
             Subtotal: {}\nShipping: {}\nDiscount: {}\nTotal: {}\n\n\
             We will let you know when it ships.\n",
            order.id,
            item_lines.join("\n"),
            order.subtotal,
            order.shipping,
            order.discount,
            order.total,
        );

        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(format!("Order confirmation {}", order.id))
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        transport.send(email).await?;
        Ok(())
    }
}
