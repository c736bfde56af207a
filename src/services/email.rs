//! Email service

use crate::config::SmtpConfig;
use anyhow::{anyhow, Result};
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Sends plain-text email over a configured SMTP relay
pub struct EmailService {
    config: SmtpConfig,
}

impl EmailService {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Send a plain-text email
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if self.config.host.is_empty() {
            return Err(anyhow!(
                "SMTP host not configured. Set smtp.host or NEWSROOM_SMTP_HOST."
            ));
        }

        let email = Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(to.parse().map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
                .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
                .credentials(creds)
                .port(self.config.port)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        tracing::info!(to = %to, "Sent email");

        Ok(())
    }
}
