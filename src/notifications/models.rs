use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::watchdog::models::AlertEvent;

/// Configuration of one outbound alert channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChannelConfig {
    /// Simulated e-mail: the message is rendered and logged, never sent.
    Email {
        from: String,
    },
    Webhook {
        url: String,
        method: String, // "GET" or "POST"
        body_template: Option<String>,
    },
}

/// Template variables available to every channel.
pub fn alert_context(alert: &AlertEvent) -> HashMap<String, String> {
    HashMap::from([
        ("alert_id".to_string(), alert.alert_id.to_string()),
        ("device_id".to_string(), alert.device_id.clone()),
        ("alert_email".to_string(), alert.alert_email.clone()),
        ("timestamp".to_string(), alert.timestamp.to_rfc3339()),
        ("timeout".to_string(), alert.timeout.to_string()),
    ])
}
