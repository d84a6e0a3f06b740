use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::events::{Event, EventListener, ListenerRegistry};
use crate::geofence::{Geofence, GeofenceKind, GeoPoint};
use crate::notification::{Notification, NotificationId, Trigger};
use crate::store::{NotificationStore, Platform};

/// Where the device last was relative to a tracked exit fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    NeverEntered,
    Inside,
}

#[derive(Debug, Clone)]
struct TrackedGeofence {
    fence: Geofence,
    presence: Presence,
}

impl TrackedGeofence {
    fn new(fence: Geofence, awaiting_exit: bool) -> Self {
        let presence = if awaiting_exit {
            Presence::Inside
        } else {
            Presence::NeverEntered
        };
        Self { fence, presence }
    }
}

#[derive(Default)]
struct TrackerState {
    geofences: HashMap<NotificationId, TrackedGeofence>,
    alarms: HashMap<NotificationId, DateTime<Utc>>,
}

/// Entry point for the mobile shell. Keeps the tracked geofence and alarm
/// indexes, fires events as the device moves or alarms come due, and fronts
/// the storage collaborator for notification CRUD.
///
/// Each fired id is untracked immediately, so no event fires twice for the
/// same record.
pub struct Tracker {
    store: Arc<dyn NotificationStore>,
    state: RwLock<TrackerState>,
    listeners: RwLock<ListenerRegistry>,
}

pub struct TrackerBuilder {
    store: Option<Arc<dyn NotificationStore>>,
}

impl TrackerBuilder {
    pub fn new() -> Self {
        Self { store: None }
    }

    pub fn with_platform(self, platform: &dyn Platform) -> Self {
        self.with_store(platform.storage())
    }

    pub fn with_store(mut self, store: Arc<dyn NotificationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Tracker> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("no notification store configured"))?;
        let tracker = Tracker {
            store,
            state: RwLock::new(TrackerState::default()),
            listeners: RwLock::new(ListenerRegistry::default()),
        };
        tracker.reload();
        Ok(tracker)
    }
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::new()
    }

    /// Rebuilds both tracking indexes from storage. Exit fences whose
    /// records carry a persisted `awaiting_exit` resume armed.
    pub fn reload(&self) {
        let mut state = self.state.write();
        state.geofences.clear();
        state.alarms.clear();
        for notification in self.store.all() {
            match notification.trigger {
                Trigger::Location(fence) => {
                    state.geofences.insert(
                        notification.id,
                        TrackedGeofence::new(fence, notification.awaiting_exit),
                    );
                }
                Trigger::Time(time) => {
                    state.alarms.insert(notification.id, time);
                }
            }
        }
        debug!(
            geofences = state.geofences.len(),
            alarms = state.alarms.len(),
            "tracking indexes loaded"
        );
    }

    /// Feed an updated device position through every tracked geofence.
    ///
    /// Enter fences fire on the first observed proximity. Exit fences arm
    /// while the device is inside (persisting the flag on the record) and
    /// fire once a later fix lands outside.
    pub fn set_current_location(&self, position: &GeoPoint) {
        let mut fired: Vec<(Event, Notification)> = Vec::new();
        {
            let mut state = self.state.write();
            let mut untrack: Vec<NotificationId> = Vec::new();
            for (&id, tracked) in state.geofences.iter_mut() {
                let inside = tracked.fence.contains(position);
                match (tracked.fence.kind, inside) {
                    (GeofenceKind::Enter, true) => {
                        match self.store.get(id) {
                            Some(notification) => {
                                fired.push((Event::GeofenceEntered, notification));
                            }
                            None => warn!(id, "tracked geofence has no stored record, dropping"),
                        }
                        untrack.push(id);
                    }
                    (GeofenceKind::Enter, false) => {}
                    (GeofenceKind::Exit, true) => {
                        if tracked.presence == Presence::Inside {
                            continue;
                        }
                        match self.store.get(id) {
                            Some(mut notification) => {
                                tracked.presence = Presence::Inside;
                                notification.awaiting_exit = true;
                                self.store.modify(id, notification);
                            }
                            None => {
                                warn!(id, "tracked geofence has no stored record, dropping");
                                untrack.push(id);
                            }
                        }
                    }
                    (GeofenceKind::Exit, false) => {
                        if tracked.presence != Presence::Inside {
                            continue;
                        }
                        match self.store.get(id) {
                            Some(mut notification) => {
                                notification.awaiting_exit = false;
                                self.store.modify(id, notification.clone());
                                fired.push((Event::GeofenceExited, notification));
                            }
                            None => warn!(id, "tracked geofence has no stored record, dropping"),
                        }
                        untrack.push(id);
                    }
                }
            }
            for id in untrack {
                state.geofences.remove(&id);
            }
        }
        for (event, notification) in &fired {
            self.broadcast(*event, notification);
        }
    }

    /// Fire every tracked alarm whose saved time equals `alarm_time`
    /// exactly. Matched ids are untracked afterwards.
    pub fn notify_alarm(&self, alarm_time: DateTime<Utc>) {
        let mut fired: Vec<Notification> = Vec::new();
        {
            let mut state = self.state.write();
            let mut untrack: Vec<NotificationId> = Vec::new();
            for (&id, &saved) in state.alarms.iter() {
                if saved != alarm_time {
                    continue;
                }
                match self.store.get(id) {
                    Some(notification) => fired.push(notification),
                    None => warn!(id, "tracked alarm has no stored record, dropping"),
                }
                untrack.push(id);
            }
            for id in untrack {
                state.alarms.remove(&id);
            }
        }
        for notification in &fired {
            self.broadcast(Event::TimeReminder, notification);
        }
    }

    pub fn add_listener(&self, event: Event, listener: Arc<dyn EventListener>) {
        self.listeners.write().add(event, listener);
    }

    /// Drops the first registration of `listener` under `event`.
    pub fn remove_listener(&self, event: Event, listener: &Arc<dyn EventListener>) -> bool {
        self.listeners.write().remove(event, listener)
    }

    /// Delivers `notification` to the catch-all listeners, then to the ones
    /// subscribed to `event`. The registry is snapshotted first, so a
    /// listener may call back into the tracker without deadlocking.
    pub fn broadcast(&self, event: Event, notification: &Notification) {
        let targets = self.listeners.read().snapshot(event);
        for listener in targets {
            listener.on_event(event, notification);
        }
    }

    /// Persists `item` and starts tracking it under the id storage assigned.
    pub fn add_notification(&self, item: Notification) -> NotificationId {
        let trigger = item.trigger.clone();
        let awaiting_exit = item.awaiting_exit;
        let id = self.store.add(item);
        let mut state = self.state.write();
        match trigger {
            Trigger::Location(fence) => {
                state
                    .geofences
                    .insert(id, TrackedGeofence::new(fence, awaiting_exit));
            }
            Trigger::Time(time) => {
                state.alarms.insert(id, time);
            }
        }
        id
    }

    /// Pass-through update. Tracking is not refreshed; delete and re-add to
    /// change what is tracked.
    pub fn modify_notification(&self, id: NotificationId, item: Notification) -> bool {
        self.store.modify(id, item)
    }

    /// Removes the record and whatever tracking entry still points at it.
    pub fn delete_notification(&self, id: NotificationId) -> bool {
        if let Some(existing) = self.store.get(id) {
            let mut state = self.state.write();
            match existing.trigger {
                Trigger::Location(_) => {
                    state.geofences.remove(&id);
                }
                Trigger::Time(_) => {
                    state.alarms.remove(&id);
                }
            }
        }
        self.store.remove(id)
    }

    pub fn notification(&self, id: NotificationId) -> Option<Notification> {
        self.store.get(id)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.store.all()
    }

    pub fn reminders(&self) -> Vec<Notification> {
        self.store.reminders()
    }

    pub fn phone_settings(&self) -> Vec<Notification> {
        self.store.phone_settings()
    }

    pub fn contains_notification(&self, id: NotificationId) -> bool {
        self.store.contains(id)
    }

    pub fn tracked_geofences(&self) -> usize {
        self.state.read().geofences.len()
    }

    pub fn tracked_alarms(&self) -> usize {
        self.state.read().alarms.len()
    }
}
