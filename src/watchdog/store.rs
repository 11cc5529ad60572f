use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::countdown::Countdown;
use super::error::StoreError;
use super::models::Monitor;

/// A monitor record together with its live countdown, if any.
///
/// Only reachable through [`MonitorStore::mutate`], so the record and the
/// countdown always change together under the device's lock.
#[derive(Debug)]
pub struct MonitorEntry {
    monitor: Monitor,
    timer: Option<Countdown>,
}

impl MonitorEntry {
    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut Monitor {
        &mut self.monitor
    }

    /// Cancels the current countdown (if any) before installing `countdown`.
    pub fn install_timer(&mut self, countdown: Countdown) {
        if let Some(mut previous) = self.timer.replace(countdown) {
            previous.cancel();
        }
    }

    /// Cancels and drops the current countdown. Returns whether one existed.
    pub fn clear_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(mut previous) => {
                previous.cancel();
                true
            }
            None => false,
        }
    }

    pub fn timer_generation(&self) -> Option<u64> {
        self.timer.as_ref().map(Countdown::generation)
    }
}

type Slot = Arc<Mutex<MonitorEntry>>;

fn lock(slot: &Slot) -> MutexGuard<'_, MonitorEntry> {
    // Every critical section leaves the entry consistent, so a poisoned lock
    // still guards valid data.
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Concurrency-safe map from device id to its [`MonitorEntry`].
///
/// Each device has its own lock: operations on one id are serialized, while
/// operations on different ids only share the map's shard lock long enough to
/// clone the slot pointer.
#[derive(Debug, Default)]
pub struct MonitorStore {
    entries: DashMap<String, Slot>,
}

impl MonitorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, monitor: Monitor) -> Result<(), StoreError> {
        self.insert_with_timer(monitor, |_| None).map(|_| ())
    }

    /// Inserts a new record, arming its first countdown before the record
    /// becomes visible to other callers. `arm` only runs if the id is free.
    pub fn insert_with_timer<F>(&self, monitor: Monitor, arm: F) -> Result<Monitor, StoreError>
    where
        F: FnOnce(&Monitor) -> Option<Countdown>,
    {
        match self.entries.entry(monitor.id.clone()) {
            Entry::Occupied(occupied) => Err(StoreError::AlreadyExists(occupied.key().clone())),
            Entry::Vacant(vacant) => {
                let timer = arm(&monitor);
                let snapshot = monitor.clone();
                vacant.insert(Arc::new(Mutex::new(MonitorEntry { monitor, timer })));
                Ok(snapshot)
            }
        }
    }

    fn slot(&self, id: &str) -> Result<Slot, StoreError> {
        self.entries
            .get(id)
            .map(|slot| slot.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Snapshot of the committed record.
    pub fn get(&self, id: &str) -> Result<Monitor, StoreError> {
        let slot = self.slot(id)?;
        let entry = lock(&slot);
        Ok(entry.monitor.clone())
    }

    /// Runs `f` with exclusive access to the device's entry.
    pub fn mutate<T, E, F>(&self, id: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut MonitorEntry) -> Result<T, E>,
        E: From<StoreError>,
    {
        let slot = self.slot(id)?;
        let mut entry = lock(&slot);
        f(&mut *entry)
    }

    pub fn install_timer(&self, id: &str, countdown: Countdown) -> Result<(), StoreError> {
        self.mutate(id, |entry| {
            entry.install_timer(countdown);
            Ok(())
        })
    }

    pub fn clear_timer(&self, id: &str) -> Result<bool, StoreError> {
        self.mutate(id, |entry| Ok(entry.clear_timer()))
    }

    /// Snapshots of every record, ordered by creation time then id.
    pub fn list(&self) -> Vec<Monitor> {
        let slots: Vec<Slot> = self.entries.iter().map(|slot| slot.value().clone()).collect();
        let mut monitors: Vec<Monitor> = slots.iter().map(|slot| lock(slot).monitor.clone()).collect();
        monitors.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        monitors
    }

    /// Cancels every live countdown; records are left as they are.
    pub fn clear_all_timers(&self) -> usize {
        let slots: Vec<Slot> = self.entries.iter().map(|slot| slot.value().clone()).collect();
        slots.iter().filter(|slot| lock(slot).clear_timer()).count()
    }
}
