//! Operator alerts.
//!
//! Alerts are best effort: a broken alert channel is logged and otherwise
//! ignored, so `notify` has no error to return.

mod telegram;

pub use telegram::TelegramNotifier;

use crate::config::NotifySettings;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Trait for operator notification channels.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

/// Writes alerts to the log only.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) {
        warn!(alert = true, "{}", message);
    }
}

/// Telegram when configured, the log otherwise.
pub fn from_settings(settings: &NotifySettings) -> Arc<dyn Notifier> {
    match settings.telegram() {
        Some((token, chat_id)) => match TelegramNotifier::new(token, chat_id) {
            Ok(notifier) => Arc::new(notifier),
            Err(e) => {
                warn!("Telegram notifier unavailable, alerts go to the log: {}", e);
                Arc::new(LogNotifier)
            }
        },
        None => Arc::new(LogNotifier),
    }
}
