use serde::{Deserialize, Serialize};

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let half_chord = (delta_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * half_chord.sqrt().asin()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GeofenceKind {
    /// Fire as soon as the device is first observed inside the fence.
    Enter,
    /// Arm while the device is inside, fire once it has left.
    Exit,
}

/// Circular area around a saved location, used to detect entry and exit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Geofence {
    pub center: GeoPoint,
    pub radius_meters: f64,
    pub kind: GeofenceKind,
}

impl Geofence {
    pub fn new(center: GeoPoint, radius_meters: f64, kind: GeofenceKind) -> Self {
        Self {
            center,
            radius_meters,
            kind,
        }
    }

    pub fn contains(&self, position: &GeoPoint) -> bool {
        self.center.distance_to(position) <= self.radius_meters
    }
}
