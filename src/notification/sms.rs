use axum::async_trait;
use serde_json::json;
use std::time::Duration;

use super::NotificationSender;
use crate::{constants::NOTIFICATION_SEND_TIMEOUT_SECS, models::user::User};

/// Delivers codes through an HTTP sms gateway API
pub struct SmsSender {
    client: reqwest::Client,
    api_url: String,
    source_addr: String,
}

impl SmsSender {
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("SMS_API_URL").ok()?;
        let source_addr = std::env::var("SMS_SOURCE_ADDR").unwrap_or("OTP".to_owned());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(NOTIFICATION_SEND_TIMEOUT_SECS))
            .build()
            .ok()?;
        Some(Self {
            client,
            api_url,
            source_addr,
        })
    }
}

#[async_trait]
impl NotificationSender for SmsSender {
    fn channel(&self) -> &'static str {
        "sms"
    }

    async fn send(&self, message: &str, user: &User) -> anyhow::Result<()> {
        let Some(phone) = &user.phone else {
            tracing::info!("user {} has no phone, skipping sms channel", user.username);
            return Ok(());
        };
        let payload = json!({
            "from": self.source_addr,
            "to": phone,
            "text": message,
        });
        let res = self
            .client
            .post(&self.api_url)
            .json(&payload)
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!("sms gateway responded with status: {}", res.status());
        }
        tracing::info!("sms sent successfully to user: {}", user.username);
        Ok(())
    }
}
