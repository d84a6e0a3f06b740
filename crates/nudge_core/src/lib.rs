pub mod events;
pub mod geofence;
pub mod notification;
pub mod store;
pub mod tracker;

pub use crate::events::{Event, EventListener};
pub use crate::geofence::{GeoPoint, Geofence, GeofenceKind};
pub use crate::notification::{
    Notification, NotificationId, Payload, PhoneSettingDetails, ReminderDetails, Trigger,
};
pub use crate::store::{MemoryStore, NotificationStore, Platform};
pub use crate::tracker::{Tracker, TrackerBuilder};
