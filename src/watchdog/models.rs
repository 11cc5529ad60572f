use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Active,
    Paused,
    /// Terminal. Nothing moves a monitor out of `Down`.
    Down,
}

impl MonitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorStatus::Active => "active",
            MonitorStatus::Paused => "paused",
            MonitorStatus::Down => "down",
        }
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted heartbeat. Pauses are not recorded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatRecord {
    pub received_at: DateTime<Utc>,
    pub event: String,
    pub timer_reset_to: u64,
}

impl HeartbeatRecord {
    pub fn new(received_at: DateTime<Utc>, timer_reset_to: u64) -> Self {
        Self {
            received_at,
            event: "heartbeat".to_string(),
            timer_reset_to,
        }
    }
}

/// The tracked state of one device.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub id: String,
    /// Seconds. Fixed at registration.
    pub timeout: u64,
    pub alert_email: String,
    pub status: MonitorStatus,
    pub created_at: DateTime<Utc>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub heartbeat_history: Vec<HeartbeatRecord>,
}

impl Monitor {
    pub fn new(id: String, timeout: u64, alert_email: String) -> Self {
        Self {
            id,
            timeout,
            alert_email,
            status: MonitorStatus::Active,
            created_at: Utc::now(),
            last_heartbeat: None,
            heartbeat_history: Vec::new(),
        }
    }

    pub fn first_heartbeat(&self) -> Option<DateTime<Utc>> {
        self.heartbeat_history.first().map(|r| r.received_at)
    }
}

/// Registration input, validated by the engine.
#[derive(Deserialize, Debug, Clone)]
pub struct NewMonitor {
    pub id: String,
    pub timeout: i64,
    pub alert_email: String,
}

/// Handed to the alert sink once per active -> down transition.
#[derive(Serialize, Debug, Clone)]
pub struct AlertEvent {
    pub alert_id: Uuid,
    pub device_id: String,
    pub alert_email: String,
    pub timestamp: DateTime<Utc>,
    pub timeout: u64,
}

impl AlertEvent {
    pub fn for_monitor(monitor: &Monitor, timestamp: DateTime<Utc>) -> Self {
        Self {
            alert_id: Uuid::new_v4(),
            device_id: monitor.id.clone(),
            alert_email: monitor.alert_email.clone(),
            timestamp,
            timeout: monitor.timeout,
        }
    }
}
