use axum::async_trait;
use serde_json::json;
use std::time::Duration;

use super::NotificationSender;
use crate::{constants::NOTIFICATION_SEND_TIMEOUT_SECS, models::user::User};

/// Delivers codes through an HTTP mail gateway API
pub struct EmailSender {
    client: reqwest::Client,
    api_url: String,
    from: String,
}

impl EmailSender {
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("MAIL_API_URL").ok()?;
        let from = std::env::var("MAIL_FROM").unwrap_or("no-reply@otpservice.local".to_owned());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(NOTIFICATION_SEND_TIMEOUT_SECS))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_url,
            from,
        })
    }
}

#[async_trait]
impl NotificationSender for EmailSender {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn send(&self, message: &str, user: &User) -> anyhow::Result<()> {
        let Some(to) = &user.email else {
            tracing::info!("user {} has no email, skipping email channel", user.username);
            return Ok(());
        };
        let payload = json!({
            "from": self.from,
            "to": to,
            "subject": "OTP Service",
            "text": message,
        });
        let res = self
            .client
            .post(&self.api_url)
            .json(&payload)
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!("mail gateway responded with status: {}", res.status());
        }
        tracing::info!("sent email to {} successfully", to);
        Ok(())
    }
}
