use axum::async_trait;
use std::sync::Arc;

use crate::models::user::User;

pub mod email;
pub mod sms;
pub mod telegram;

pub use email::EmailSender;
pub use sms::SmsSender;
pub use telegram::TelegramSender;

/// One delivery channel. A sender may decide to no-op when the user lacks
/// the relevant contact field, that is a successful send.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    fn channel(&self) -> &'static str;
    async fn send(&self, message: &str, user: &User) -> anyhow::Result<()>;
}

/// Fan the message out to every configured channel. Each send runs in its
/// own task: a failing or hanging channel cannot cancel, delay or alter any
/// other channel and nothing propagates back to the caller. No ordering, no
/// retry, best effort only.
pub fn dispatch(message: &str, user: &User, senders: &[Arc<dyn NotificationSender>]) {
    for sender in senders {
        let sender = Arc::clone(sender);
        let message = message.to_owned();
        let user = user.clone();
        tokio::spawn(async move {
            match sender.send(&message, &user).await {
                Ok(()) => {
                    tracing::debug!(
                        "notification sent via {} to user: {}",
                        sender.channel(),
                        user.username
                    );
                }
                Err(err) => {
                    tracing::error!(
                        "failed to send notification via {} to user: {}: {:?}",
                        sender.channel(),
                        user.username,
                        err
                    );
                }
            }
        });
    }
}

/// Builds the channel sender set from environment configuration at process
/// start. A channel whose configuration is absent is simply not registered.
pub fn build_senders() -> Vec<Arc<dyn NotificationSender>> {
    let mut senders: Vec<Arc<dyn NotificationSender>> = vec![];
    match EmailSender::from_env() {
        Some(sender) => senders.push(Arc::new(sender)),
        None => tracing::info!("email notification channel is not configured"),
    }
    match SmsSender::from_env() {
        Some(sender) => senders.push(Arc::new(sender)),
        None => tracing::info!("sms notification channel is not configured"),
    }
    match TelegramSender::from_env() {
        Some(sender) => senders.push(Arc::new(sender)),
        None => tracing::info!("telegram notification channel is not configured"),
    }
    senders
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    struct RecordingSender {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSender for RecordingSender {
        fn channel(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, _message: &str, _user: &User) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("channel down");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_isolates_failing_channel() {
        let calls = [
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        ];
        let senders: Vec<Arc<dyn NotificationSender>> = vec![
            Arc::new(RecordingSender {
                calls: calls[0].clone(),
                fail: false,
            }),
            Arc::new(RecordingSender {
                calls: calls[1].clone(),
                fail: true,
            }),
            Arc::new(RecordingSender {
                calls: calls[2].clone(),
                fail: false,
            }),
        ];
        let user = User::default();
        // must not panic or report anything even with a failing channel
        dispatch("Your verification code: Abc123", &user, &senders);
        tokio::time::sleep(Duration::from_millis(100)).await;
        for call_count in &calls {
            assert_eq!(call_count.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_dispatch_with_no_senders_is_noop() {
        dispatch("Your verification code: Abc123", &User::default(), &[]);
    }
}
