use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use super::models::ChannelConfig;

pub mod email;
pub mod webhook;

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Failed to send notification: {0}")]
    SendFailed(String),
    #[error("Invalid configuration for sender: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Templating error: {0}")]
    TemplatingError(String),
}

/// A channel-specific way of delivering an alert message.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends a notification.
    ///
    /// * `config` - the channel's configuration; senders reject a mismatched variant.
    /// * `message` - default message body, used when the channel has no template of its own.
    /// * `context` - template variables (`device_id`, `alert_email`, `timestamp`, ...).
    async fn send(
        &self,
        config: &ChannelConfig,
        message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), SenderError>;

    fn channel_name(&self) -> &'static str;
}
