use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::countdown::Countdown;
use super::error::WatchdogError;
use super::models::{AlertEvent, HeartbeatRecord, Monitor, MonitorStatus, NewMonitor};
use super::store::{MonitorEntry, MonitorStore};
use crate::notifications::AlertSink;

/// Owns the monitor state machine.
///
/// The engine is the only code that changes a monitor's status and the only
/// code that arms countdowns. Every decision that depends on the current
/// status goes through [`MonitorStore::mutate`], so heartbeat, pause and
/// expiry for one device are totally ordered.
#[derive(Clone)]
pub struct WatchdogEngine {
    store: Arc<MonitorStore>,
    alert_sink: Arc<dyn AlertSink>,
    next_generation: Arc<AtomicU64>,
}

impl WatchdogEngine {
    pub fn new(alert_sink: Arc<dyn AlertSink>) -> Self {
        Self {
            store: Arc::new(MonitorStore::new()),
            alert_sink,
            next_generation: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Starts a countdown whose expiry is checked against `generation`.
    fn arm(&self, device_id: &str, timeout_secs: u64) -> Countdown {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let engine = self.clone();
        let id = device_id.to_string();
        Countdown::start(
            device_id.to_string(),
            generation,
            Duration::from_secs(timeout_secs),
            move || async move { engine.on_expiry(&id, generation).await },
        )
    }

    pub fn register(&self, request: NewMonitor) -> Result<Monitor, WatchdogError> {
        if self.store.get(&request.id).is_ok() {
            return Err(WatchdogError::DuplicateId(request.id));
        }
        if request.timeout <= 0 {
            return Err(WatchdogError::InvalidTimeout(request.timeout));
        }
        let timeout = request.timeout as u64;

        let monitor = Monitor::new(request.id, timeout, request.alert_email);
        let created = self
            .store
            .insert_with_timer(monitor, |m| Some(self.arm(&m.id, m.timeout)))?;

        info!(
            device_id = %created.id,
            timeout_secs = created.timeout,
            alert_email = %created.alert_email,
            "Monitor registered."
        );
        Ok(created)
    }

    /// Re-arms the countdown with the monitor's full timeout. A paused monitor
    /// is resumed; a down monitor is rejected.
    pub fn heartbeat(&self, device_id: &str) -> Result<Monitor, WatchdogError> {
        let (snapshot, resumed) = self.store.mutate(device_id, |entry: &mut MonitorEntry| {
            let previous = entry.monitor().status;
            if previous == MonitorStatus::Down {
                return Err(WatchdogError::AlreadyDown(device_id.to_string()));
            }

            let timeout = entry.monitor().timeout;
            entry.install_timer(self.arm(device_id, timeout));

            let now = Utc::now();
            let monitor = entry.monitor_mut();
            monitor.status = MonitorStatus::Active;
            monitor.last_heartbeat = Some(now);
            monitor.heartbeat_history.push(HeartbeatRecord::new(now, timeout));
            Ok((monitor.clone(), previous == MonitorStatus::Paused))
        })?;

        info!(
            device_id = %device_id,
            timeout_secs = snapshot.timeout,
            resumed,
            "Heartbeat received, timer reset."
        );
        Ok(snapshot)
    }

    pub fn pause(&self, device_id: &str) -> Result<Monitor, WatchdogError> {
        let snapshot = self.store.mutate(device_id, |entry: &mut MonitorEntry| {
            match entry.monitor().status {
                MonitorStatus::Down => return Err(WatchdogError::CannotPauseDown(device_id.to_string())),
                MonitorStatus::Paused => return Err(WatchdogError::AlreadyPaused(device_id.to_string())),
                MonitorStatus::Active => {}
            }
            entry.clear_timer();
            entry.monitor_mut().status = MonitorStatus::Paused;
            Ok(entry.monitor().clone())
        })?;

        info!(device_id = %device_id, "Monitor paused.");
        Ok(snapshot)
    }

    pub fn get(&self, device_id: &str) -> Result<Monitor, WatchdogError> {
        Ok(self.store.get(device_id)?)
    }

    pub fn list(&self) -> Vec<Monitor> {
        self.store.list()
    }

    /// Runs on the countdown's own task once its wait has elapsed.
    ///
    /// The down transition is committed under the device's lock and only if
    /// this countdown is still the installed one and the monitor is still
    /// active. The alert sink is called afterwards, outside the lock.
    pub(crate) async fn on_expiry(&self, device_id: &str, generation: u64) {
        let outcome = self.store.mutate(device_id, |entry: &mut MonitorEntry| {
            if entry.timer_generation() != Some(generation) {
                return Ok::<_, WatchdogError>(None);
            }
            entry.clear_timer();
            if entry.monitor().status != MonitorStatus::Active {
                return Ok(None);
            }
            entry.monitor_mut().status = MonitorStatus::Down;
            Ok(Some(AlertEvent::for_monitor(entry.monitor(), Utc::now())))
        });

        let alert = match outcome {
            Ok(Some(alert)) => alert,
            Ok(None) => {
                debug!(device_id = %device_id, generation, "Stale countdown ignored.");
                return;
            }
            Err(e) => {
                debug!(device_id = %device_id, generation, error = %e, "Countdown expired for unknown monitor.");
                return;
            }
        };

        warn!(
            device_id = %device_id,
            timeout_secs = alert.timeout,
            "No heartbeat received before timeout, monitor is down."
        );
        if let Err(e) = self.alert_sink.notify(&alert).await {
            error!(device_id = %device_id, alert_id = %alert.alert_id, error = %e, "Alert sink failed.");
        }
    }

    /// Cancels every live countdown without touching statuses or firing alerts.
    pub fn shutdown(&self) {
        let cancelled = self.store.clear_all_timers();
        info!(cancelled, "Watchdog engine stopped all countdowns.");
    }

    #[cfg(test)]
    pub(crate) fn timer_generation(&self, device_id: &str) -> Option<u64> {
        self.store
            .mutate(device_id, |entry: &mut MonitorEntry| {
                Ok::<_, WatchdogError>(entry.timer_generation())
            })
            .ok()
            .flatten()
    }
}
