use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::notification::Notification;

/// Everything the tracker can announce to the platform layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Event {
    /// Catch-all subscription; listeners under it see every broadcast.
    All,
    GeofenceEntered,
    GeofenceExited,
    TimeReminder,
}

/// Platform-specific adapters (status bar, sound, device toggles) implement
/// this trait.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: Event, notification: &Notification);
}

/// Ordered listener lists keyed by event. The same listener may be
/// registered more than once; removal drops the first registration only.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<Event, Vec<Arc<dyn EventListener>>>,
}

impl ListenerRegistry {
    pub fn add(&mut self, event: Event, listener: Arc<dyn EventListener>) {
        self.listeners.entry(event).or_default().push(listener);
    }

    pub fn remove(&mut self, event: Event, listener: &Arc<dyn EventListener>) -> bool {
        let Some(registered) = self.listeners.get_mut(&event) else {
            return false;
        };
        match registered.iter().position(|entry| Arc::ptr_eq(entry, listener)) {
            Some(index) => {
                registered.remove(index);
                true
            }
            None => false,
        }
    }

    /// Delivery list for one broadcast: catch-all listeners first, then the
    /// ones registered for `event`, each group in insertion order.
    pub fn snapshot(&self, event: Event) -> Vec<Arc<dyn EventListener>> {
        let mut targets = Vec::new();
        if let Some(catch_all) = self.listeners.get(&Event::All) {
            targets.extend(catch_all.iter().cloned());
        }
        if let Some(specific) = self.listeners.get(&event) {
            targets.extend(specific.iter().cloned());
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{Notification, Trigger};
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;

    struct Tagged {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl EventListener for Tagged {
        fn on_event(&self, _event: Event, _notification: &Notification) {
            self.log.lock().push(self.tag);
        }
    }

    fn sample() -> Notification {
        let due = Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap();
        Notification::reminder("sample", Trigger::Time(due), "sample text")
    }

    fn deliver(registry: &ListenerRegistry, event: Event) {
        let notification = sample();
        for listener in registry.snapshot(event) {
            listener.on_event(event, &notification);
        }
    }

    #[test]
    fn catch_all_listeners_run_before_specific_ones() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::default();
        registry.add(
            Event::TimeReminder,
            Arc::new(Tagged {
                tag: "specific",
                log: log.clone(),
            }),
        );
        registry.add(
            Event::All,
            Arc::new(Tagged {
                tag: "all",
                log: log.clone(),
            }),
        );

        deliver(&registry, Event::TimeReminder);
        assert_eq!(*log.lock(), vec!["all", "specific"]);
    }

    #[test]
    fn snapshot_skips_unrelated_events() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::default();
        registry.add(
            Event::GeofenceEntered,
            Arc::new(Tagged {
                tag: "enter",
                log: log.clone(),
            }),
        );

        deliver(&registry, Event::TimeReminder);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn duplicate_registrations_fire_twice_and_remove_drops_one() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let listener: Arc<dyn EventListener> = Arc::new(Tagged {
            tag: "dup",
            log: log.clone(),
        });
        let mut registry = ListenerRegistry::default();
        registry.add(Event::TimeReminder, listener.clone());
        registry.add(Event::TimeReminder, listener.clone());

        deliver(&registry, Event::TimeReminder);
        assert_eq!(log.lock().len(), 2);

        assert!(registry.remove(Event::TimeReminder, &listener));
        deliver(&registry, Event::TimeReminder);
        assert_eq!(log.lock().len(), 3);

        assert!(registry.remove(Event::TimeReminder, &listener));
        assert!(!registry.remove(Event::TimeReminder, &listener));
        deliver(&registry, Event::TimeReminder);
        assert_eq!(log.lock().len(), 3);
    }
}
