use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

use super::AlertSink;
use super::models::{ChannelConfig, alert_context};
use super::senders::{NotificationSender, SenderError, email::EmailSender, webhook::WebhookSender};
use crate::server::config::ServerConfig;
use crate::watchdog::models::AlertEvent;

// String fields go through `json_encode` so quotes and backslashes in device
// ids or addresses stay valid JSON.
pub const DEFAULT_WEBHOOK_BODY: &str = r#"{"alert_id": {{ alert_id | json_encode() | safe }}, "device_id": {{ device_id | json_encode() | safe }}, "alert_email": {{ alert_email | json_encode() | safe }}, "timestamp": {{ timestamp | json_encode() | safe }}, "timeout": {{ timeout }} }"#;

/// Production alert sink: logs the down event and fans it out to every
/// configured channel.
pub struct NotificationService {
    channels: Vec<(ChannelConfig, Box<dyn NotificationSender>)>,
}

impl NotificationService {
    pub fn new(channels: Vec<(ChannelConfig, Box<dyn NotificationSender>)>) -> Self {
        Self { channels }
    }

    /// The simulated e-mail channel is always present; the webhook channel only
    /// when `webhook_url` is configured.
    pub fn from_config(config: &ServerConfig) -> Result<Self, SenderError> {
        let mut channels: Vec<(ChannelConfig, Box<dyn NotificationSender>)> = vec![(
            ChannelConfig::Email {
                from: config.alert_from.clone(),
            },
            Box::new(EmailSender::new()) as Box<dyn NotificationSender>,
        )];

        if let Some(url) = &config.webhook_url {
            channels.push((
                ChannelConfig::Webhook {
                    url: url.clone(),
                    method: config.webhook_method.clone(),
                    body_template: config.webhook_body_template.clone(),
                },
                Box::new(WebhookSender::new(Duration::from_secs(config.webhook_timeout_secs))?)
                    as Box<dyn NotificationSender>,
            ));
        }

        Ok(Self::new(channels))
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|(_, sender)| sender.channel_name()).collect()
    }
}

#[async_trait]
impl AlertSink for NotificationService {
    async fn notify(&self, alert: &AlertEvent) -> Result<(), SenderError> {
        let payload = json!({
            "ALERT": format!("Device {} is DOWN! No heartbeat received.", alert.device_id),
            "time": alert.timestamp.to_rfc3339(),
            "alert_email": alert.alert_email,
        });
        error!(device_id = %alert.device_id, alert_id = %alert.alert_id, "DEVICE DOWN: {}", payload);

        let context = alert_context(alert);
        let mut first_error = None;
        for (config, sender) in &self.channels {
            match sender.send(config, DEFAULT_WEBHOOK_BODY, &context).await {
                Ok(()) => {
                    info!(device_id = %alert.device_id, channel = sender.channel_name(), "Alert delivered.");
                }
                Err(e) => {
                    error!(device_id = %alert.device_id, channel = sender.channel_name(), error = %e, "Failed to deliver alert.");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
