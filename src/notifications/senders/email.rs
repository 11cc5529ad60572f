use async_trait::async_trait;
use std::collections::HashMap;
use tera::{Context, Tera};
use tracing::info;

use super::{NotificationSender, SenderError};
use crate::notifications::models::ChannelConfig;
use crate::version::VERSION;

const SUBJECT_TEMPLATE: &str = "CRITICAL — Device '{{ device_id }}' is offline";
const BODY_TEMPLATE: &str = "Device '{{ device_id }}' has not sent a heartbeat.\n\
Last checked: {{ timestamp }}\n\
Immediate action required.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Renders the alert e-mail and writes it to the log instead of a mail server.
#[derive(Default)]
pub struct EmailSender;

impl EmailSender {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        from: &str,
        context: &HashMap<String, String>,
    ) -> Result<EmailMessage, SenderError> {
        let to = context.get("alert_email").cloned().ok_or_else(|| {
            SenderError::InvalidConfiguration("alert_email missing from alert context".to_string())
        })?;

        let mut tera_context = Context::new();
        for (key, value) in context {
            tera_context.insert(key, value);
        }
        let subject = Tera::one_off(SUBJECT_TEMPLATE, &tera_context, false)
            .map_err(|e| SenderError::TemplatingError(e.to_string()))?;
        let body = Tera::one_off(BODY_TEMPLATE, &tera_context, false)
            .map_err(|e| SenderError::TemplatingError(e.to_string()))?;

        Ok(EmailMessage {
            to,
            from: from.to_string(),
            subject,
            body,
        })
    }
}

#[async_trait]
impl NotificationSender for EmailSender {
    async fn send(
        &self,
        config: &ChannelConfig,
        _message: &str,
        context: &HashMap<String, String>,
    ) -> Result<(), SenderError> {
        let from = match config {
            ChannelConfig::Email { from } => from,
            _ => {
                return Err(SenderError::InvalidConfiguration(
                    "Expected Email config, but found a different type.".to_string(),
                ));
            }
        };

        let email = self.render(from, context)?;
        info!("=======================================================");
        info!("SIMULATING EMAIL ALERT");
        info!("   To:      {}", email.to);
        info!("   Subject: {}", email.subject);
        for line in email.body.lines() {
            info!("   Body:    {}", line);
        }
        info!("   From:    {}", email.from);
        info!("   System:  Pulse Check API v{}", VERSION);
        info!("=======================================================");
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "email"
    }
}
