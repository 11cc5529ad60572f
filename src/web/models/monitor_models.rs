use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::watchdog::models::{HeartbeatRecord, Monitor, MonitorStatus};

#[derive(Serialize, Debug, Clone)]
pub struct MonitorCreated {
    pub message: String,
    pub device_id: String,
    pub timeout: u64,
    pub status: MonitorStatus,
}

impl From<&Monitor> for MonitorCreated {
    fn from(monitor: &Monitor) -> Self {
        Self {
            message: format!("Monitor created for device '{}'", monitor.id),
            device_id: monitor.id.clone(),
            timeout: monitor.timeout,
            status: monitor.status,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct HeartbeatAccepted {
    pub message: String,
    pub device_id: String,
    pub timeout: u64,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub status: MonitorStatus,
}

impl From<&Monitor> for HeartbeatAccepted {
    fn from(monitor: &Monitor) -> Self {
        Self {
            message: format!("Heartbeat received. Timer reset for '{}'", monitor.id),
            device_id: monitor.id.clone(),
            timeout: monitor.timeout,
            last_heartbeat: monitor.last_heartbeat,
            status: monitor.status,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct MonitorPaused {
    pub message: String,
    pub device_id: String,
    pub status: MonitorStatus,
}

impl From<&Monitor> for MonitorPaused {
    fn from(monitor: &Monitor) -> Self {
        Self {
            message: format!("Monitor '{}' paused. Send a heartbeat to resume.", monitor.id),
            device_id: monitor.id.clone(),
            status: monitor.status,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct MonitorList {
    pub monitors: Vec<Monitor>,
    pub total: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct MonitorHistory {
    pub device_id: String,
    pub status: MonitorStatus,
    pub total_heartbeats: usize,
    pub first_heartbeat: Option<DateTime<Utc>>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub history: Vec<HeartbeatRecord>,
}

impl From<Monitor> for MonitorHistory {
    fn from(monitor: Monitor) -> Self {
        Self {
            device_id: monitor.id.clone(),
            status: monitor.status,
            total_heartbeats: monitor.heartbeat_history.len(),
            first_heartbeat: monitor.first_heartbeat(),
            last_heartbeat: monitor.last_heartbeat,
            history: monitor.heartbeat_history,
        }
    }
}
