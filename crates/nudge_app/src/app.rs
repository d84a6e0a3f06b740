use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use nudge_core::{Event, EventListener, GeoPoint, MemoryStore, Notification, Tracker};

use crate::scenario::{self, Scenario, Step};

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub scenario: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("NUDGE_SCENARIO") {
            config.scenario = Some(PathBuf::from(path));
        }
        Ok(config)
    }
}

/// Logs every event the tracker fires during a replay.
struct LogListener;

impl EventListener for LogListener {
    fn on_event(&self, event: Event, notification: &Notification) {
        info!(?event, id = notification.id, title = %notification.title, "event fired");
    }
}

#[derive(Default)]
struct EventCounter {
    fired: AtomicUsize,
}

impl EventListener for EventCounter {
    fn on_event(&self, _event: Event, _notification: &Notification) {
        self.fired.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct ReplaySummary {
    pub events_fired: usize,
}

pub fn run(config: AppConfig) -> Result<()> {
    let Some(path) = config.scenario else {
        anyhow::bail!("no scenario configured; set NUDGE_SCENARIO to a replay file");
    };
    let scenario = scenario::load(&path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;
    let summary = replay(&scenario)?;
    info!(
        steps = scenario.steps.len(),
        events = summary.events_fired,
        "replay finished"
    );
    Ok(())
}

/// Seeds an in-memory store with the scenario's notifications and feeds the
/// recorded signals through a fresh tracker.
pub fn replay(scenario: &Scenario) -> Result<ReplaySummary> {
    let store = Arc::new(MemoryStore::new());
    let tracker = Tracker::builder().with_store(store).build()?;

    for notification in &scenario.notifications {
        let id = tracker.add_notification(notification.clone());
        debug!(id, "seeded notification");
    }

    let counter = Arc::new(EventCounter::default());
    tracker.add_listener(Event::All, Arc::new(LogListener));
    tracker.add_listener(Event::All, counter.clone());

    for step in &scenario.steps {
        match step {
            Step::LocationFix {
                latitude,
                longitude,
            } => {
                tracker.set_current_location(&GeoPoint::new(*latitude, *longitude));
            }
            Step::Alarm { time } => tracker.notify_alarm(*time),
        }
    }

    Ok(ReplaySummary {
        events_fired: counter.fired.load(Ordering::Relaxed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nudge_core::{Geofence, GeofenceKind, Trigger};

    #[test]
    fn replay_fires_the_expected_events() {
        let due = Utc.with_ymd_and_hms(2026, 7, 1, 6, 30, 0).unwrap();
        let scenario = Scenario {
            notifications: vec![
                Notification::reminder(
                    "bakery",
                    Trigger::Location(Geofence::new(
                        GeoPoint::new(48.8566, 2.3522),
                        100.0,
                        GeofenceKind::Enter,
                    )),
                    "grab bread",
                ),
                Notification::reminder("morning alarm", Trigger::Time(due), "wake up"),
            ],
            steps: vec![
                Step::LocationFix {
                    latitude: 48.85705,
                    longitude: 2.3522,
                },
                Step::Alarm { time: due },
                Step::Alarm { time: due },
            ],
        };

        let summary = replay(&scenario).expect("replay");
        assert_eq!(summary.events_fired, 2);
    }
}
