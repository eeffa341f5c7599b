use axum::async_trait;
use serde_json::json;
use std::time::Duration;

use super::NotificationSender;
use crate::{constants::NOTIFICATION_SEND_TIMEOUT_SECS, models::user::User};

/// Delivers codes through the Telegram bot API
pub struct TelegramSender {
    client: reqwest::Client,
    send_message_url: String,
}

impl TelegramSender {
    pub fn from_env() -> Option<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(NOTIFICATION_SEND_TIMEOUT_SECS))
            .build()
            .ok()?;
        Some(Self {
            client,
            send_message_url: format!("https://api.telegram.org/bot{token}/sendMessage"),
        })
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: &str, user: &User) -> anyhow::Result<()> {
        let Some(chat_id) = user.telegram_id else {
            tracing::info!(
                "user {} has no telegram id, skipping telegram channel",
                user.username
            );
            return Ok(());
        };
        let payload = json!({
            "chat_id": chat_id,
            "text": message,
        });
        let res = self
            .client
            .post(&self.send_message_url)
            .json(&payload)
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!("telegram api responded with status: {}", res.status());
        }
        tracing::info!("sent telegram message to user: {}", user.username);
        Ok(())
    }
}
