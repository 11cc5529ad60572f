pub mod models;
pub mod senders;
pub mod service;

use async_trait::async_trait;

use crate::watchdog::models::AlertEvent;
use senders::SenderError;

/// Receives one event per active -> down transition.
///
/// Implementations own their delivery policy; the engine logs a returned error
/// and moves on.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, alert: &AlertEvent) -> Result<(), SenderError>;
}
