use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geofence::Geofence;

/// Storage-assigned identifier. `0` marks a record that has not been
/// persisted yet.
pub type NotificationId = u64;

/// A saved reminder or phone-setting entry together with the trigger that
/// fires it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub trigger: Trigger,
    pub payload: Payload,
    /// Set while the device has been observed inside an exit fence and the
    /// departure has not fired yet. Persisted so an in-progress exit
    /// survives a restart.
    #[serde(default)]
    pub awaiting_exit: bool,
}

/// What causes a notification to fire: reaching a place or reaching a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Trigger {
    Location(Geofence),
    Time(DateTime<Utc>),
}

/// What happens when a notification fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Payload {
    Reminder(ReminderDetails),
    PhoneSetting(PhoneSettingDetails),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderDetails {
    pub text: String,
}

/// Device toggles applied when a phone-setting notification fires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhoneSettingDetails {
    pub vibration: bool,
    pub wifi: bool,
    pub bluetooth: bool,
    pub mobile_data: bool,
    pub sound_level: u8,
}

impl Notification {
    pub fn reminder(title: impl Into<String>, trigger: Trigger, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            trigger,
            payload: Payload::Reminder(ReminderDetails { text: text.into() }),
            awaiting_exit: false,
        }
    }

    pub fn phone_setting(
        title: impl Into<String>,
        trigger: Trigger,
        details: PhoneSettingDetails,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            trigger,
            payload: Payload::PhoneSetting(details),
            awaiting_exit: false,
        }
    }

    pub fn geofence(&self) -> Option<&Geofence> {
        match &self.trigger {
            Trigger::Location(fence) => Some(fence),
            Trigger::Time(_) => None,
        }
    }

    pub fn alarm_time(&self) -> Option<DateTime<Utc>> {
        match &self.trigger {
            Trigger::Location(_) => None,
            Trigger::Time(time) => Some(*time),
        }
    }

    pub fn is_reminder(&self) -> bool {
        matches!(self.payload, Payload::Reminder(_))
    }

    pub fn is_phone_setting(&self) -> bool {
        matches!(self.payload, Payload::PhoneSetting(_))
    }
}
