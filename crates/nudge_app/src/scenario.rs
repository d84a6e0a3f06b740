use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nudge_core::Notification;

/// Recorded inputs for one replay run: the notifications to seed storage
/// with, then the platform signals in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub notifications: Vec<Notification>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// A device position fix.
    LocationFix { latitude: f64, longitude: f64 },
    /// The platform alarm service ringing for `time`.
    Alarm { time: DateTime<Utc> },
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unable to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn load(path: &Path) -> Result<Scenario, ScenarioError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_trace() {
        let raw = r#"{
            "notifications": [
                {
                    "id": 0,
                    "title": "morning alarm",
                    "trigger": { "Time": "2026-07-01T06:30:00Z" },
                    "payload": { "Reminder": { "text": "wake up" } }
                }
            ],
            "steps": [
                { "kind": "location_fix", "latitude": 48.85, "longitude": 2.35 },
                { "kind": "alarm", "time": "2026-07-01T06:30:00Z" }
            ]
        }"#;
        let scenario: Scenario = serde_json::from_str(raw).expect("parse scenario");
        assert_eq!(scenario.notifications.len(), 1);
        assert_eq!(scenario.steps.len(), 2);
        assert!(matches!(scenario.steps[0], Step::LocationFix { .. }));
        assert!(matches!(scenario.steps[1], Step::Alarm { .. }));
    }

    #[test]
    fn rejects_unknown_step_kinds() {
        let raw = r#"{
            "notifications": [],
            "steps": [ { "kind": "teleport", "latitude": 0.0, "longitude": 0.0 } ]
        }"#;
        assert!(serde_json::from_str::<Scenario>(raw).is_err());
    }
}
