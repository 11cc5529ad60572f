use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::collections::HashMap;
use std::time::Duration;
use tera::{Context, Tera};

use super::{NotificationSender, SenderError};
use crate::notifications::models::ChannelConfig;

/// A sender for pushing alerts to a custom webhook.
///
/// Every request is bounded by `timeout`, so an endpoint that never answers
/// cannot hold the expired countdown's task.
pub struct WebhookSender {
    client: Client,
}

impl WebhookSender {
    pub fn new(timeout: Duration) -> Result<Self, SenderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

fn parse_method(method: &str) -> Result<Method, SenderError> {
    match method.to_uppercase().as_str() {
        "POST" => Ok(Method::POST),
        "GET" => Ok(Method::GET),
        _ => Err(SenderError::InvalidConfiguration(format!(
            "Unsupported HTTP method: {method}"
        ))),
    }
}

pub fn render_body(template: &str, context: &HashMap<String, String>) -> Result<String, SenderError> {
    let mut tera_context = Context::new();
    for (key, value) in context {
        tera_context.insert(key, value);
    }
    Tera::one_off(template, &tera_context, false).map_err(|e| SenderError::TemplatingError(e.to_string()))
}

#[async_trait]
impl NotificationSender for WebhookSender {
    async fn send(
        &self,
        config: &ChannelConfig,
        message: &str, // Body template when the channel has none; ignored for GET
        context: &HashMap<String, String>,
    ) -> Result<(), SenderError> {
        let (url, method, body_template) = match config {
            ChannelConfig::Webhook {
                url,
                method,
                body_template,
            } => (url, method, body_template),
            _ => {
                return Err(SenderError::InvalidConfiguration(
                    "Expected Webhook config, but found a different type.".to_string(),
                ));
            }
        };

        let http_method = parse_method(method)?;
        let mut request_builder = self.client.request(http_method.clone(), url);

        if http_method == Method::POST {
            let template = body_template.as_deref().unwrap_or(message);
            let rendered_body = render_body(template, context)?;
            request_builder = request_builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(rendered_body);
        }

        let response = request_builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(SenderError::SendFailed(format!(
                "Webhook returned non-success status: {status}. Body: {error_body}"
            )));
        }

        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "webhook"
    }
}
