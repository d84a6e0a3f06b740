use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::notification::{Notification, NotificationId};

/// Durable storage for notification records. The mobile shell supplies the
/// real backend; [`MemoryStore`] covers tests and replay runs.
///
/// Absent lookups mean "no such notification"; write operations report
/// success with a plain boolean.
pub trait NotificationStore: Send + Sync {
    fn all(&self) -> Vec<Notification>;
    fn get(&self, id: NotificationId) -> Option<Notification>;
    /// Persists `item`, allocating an id when `item.id` is `0`. Returns the
    /// effective id.
    fn add(&self, item: Notification) -> NotificationId;
    fn modify(&self, id: NotificationId, item: Notification) -> bool;
    fn remove(&self, id: NotificationId) -> bool;
    fn contains(&self, id: NotificationId) -> bool;
    fn reminders(&self) -> Vec<Notification>;
    fn phone_settings(&self) -> Vec<Notification>;
}

/// Capabilities the host device exposes to the core.
pub trait Platform: Send + Sync {
    fn storage(&self) -> Arc<dyn NotificationStore>;
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<NotificationId, Notification>,
    last_id: NotificationId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationStore for MemoryStore {
    fn all(&self) -> Vec<Notification> {
        let inner = self.inner.read();
        let mut records: Vec<Notification> = inner.records.values().cloned().collect();
        records.sort_by_key(|record| record.id);
        records
    }

    fn get(&self, id: NotificationId) -> Option<Notification> {
        self.inner.read().records.get(&id).cloned()
    }

    fn add(&self, mut item: Notification) -> NotificationId {
        let mut inner = self.inner.write();
        let id = if item.id == 0 {
            inner.last_id + 1
        } else {
            item.id
        };
        inner.last_id = inner.last_id.max(id);
        item.id = id;
        inner.records.insert(id, item);
        id
    }

    fn modify(&self, id: NotificationId, mut item: Notification) -> bool {
        let mut inner = self.inner.write();
        match inner.records.get_mut(&id) {
            Some(slot) => {
                item.id = id;
                *slot = item;
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: NotificationId) -> bool {
        self.inner.write().records.remove(&id).is_some()
    }

    fn contains(&self, id: NotificationId) -> bool {
        self.inner.read().records.contains_key(&id)
    }

    fn reminders(&self) -> Vec<Notification> {
        self.all()
            .into_iter()
            .filter(Notification::is_reminder)
            .collect()
    }

    fn phone_settings(&self) -> Vec<Notification> {
        self.all()
            .into_iter()
            .filter(Notification::is_phone_setting)
            .collect()
    }
}
