//! Proximity search over parking spots.

pub mod distance;
pub mod handlers;
pub mod query;
pub mod search;

use serde::Serialize;

use crate::db::models::ParkingSpot;
use crate::error::AppError;

pub use distance::{distance_km, EARTH_RADIUS_KM};
pub use query::SpotQuery;
pub use search::search;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Checked constructor for untrusted input.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        let coordinate = Self { latitude, longitude };
        if !coordinate.is_valid() {
            return Err(AppError::ValidationError(format!(
                "Coordinate ({}, {}) is out of range",
                latitude, longitude
            )));
        }
        Ok(coordinate)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A spot as seen by the search: position, availability and listing details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpotCandidate {
    pub id: i64,
    pub coordinate: Coordinate,
    pub is_available: bool,
    pub price_per_hour: f64,
    pub title: Option<String>,
    pub parking_type: Option<String>,
    pub contact_phone: Option<String>,
    pub availability_hours: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub max_vehicle_size: String,
    pub owner_id: Option<i64>,
}

impl From<ParkingSpot> for SpotCandidate {
    fn from(spot: ParkingSpot) -> Self {
        Self {
            id: spot.id,
            coordinate: Coordinate {
                latitude: spot.latitude,
                longitude: spot.longitude,
            },
            is_available: spot.is_available && spot.is_active,
            price_per_hour: spot.price_per_hour,
            title: spot.title,
            parking_type: spot.parking_type,
            contact_phone: spot.contact_phone,
            availability_hours: spot.availability_hours,
            location: spot.location,
            description: spot.description,
            max_vehicle_size: spot.max_vehicle_size,
            owner_id: spot.owner_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSpot {
    pub spot: SpotCandidate,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.0001, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 10.0).is_err());
        assert!(Coordinate::new(10.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_inactive_spot_is_not_available() {
        let now = chrono::Utc::now();
        let spot = ParkingSpot {
            id: 1,
            title: None,
            description: None,
            location: None,
            latitude: 22.5,
            longitude: 88.3,
            price_per_hour: 20.0,
            parking_type: None,
            is_available: true,
            owner_id: None,
            max_vehicle_size: "car".into(),
            contact_phone: None,
            availability_hours: "24/7".into(),
            created_at: now,
            updated_at: now,
            is_active: false,
        };
        assert!(!SpotCandidate::from(spot).is_available);
    }
}
