use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub mobile_number: Option<String>,
    pub gender: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl User {
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

/// Fields needed to insert a user; the store assigns the id and timestamps.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub mobile_number: Option<String>,
    pub gender: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParkingSpot {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_hour: f64,
    pub parking_type: Option<String>,
    pub is_available: bool,
    pub owner_id: Option<i64>,
    pub max_vehicle_size: String,
    pub contact_phone: Option<String>,
    pub availability_hours: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewSpot {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_hour: f64,
    pub parking_type: Option<String>,
    pub owner_id: i64,
    pub max_vehicle_size: String,
    pub contact_phone: Option<String>,
    pub availability_hours: String,
}

impl NewSpot {
    pub fn new(owner_id: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            title: None,
            description: None,
            location: None,
            latitude,
            longitude,
            price_per_hour: 0.0,
            parking_type: None,
            owner_id,
            max_vehicle_size: "car".to_string(),
            contact_phone: None,
            availability_hours: "24/7".to_string(),
        }
    }

    /// Title to store: the given one, or "Parking - " plus the first 50
    /// characters of the location.
    pub fn resolved_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => {
                let short: String = self
                    .location
                    .as_deref()
                    .unwrap_or("Parking Spot")
                    .chars()
                    .take(50)
                    .collect();
                format!("Parking - {}", short)
            }
        }
    }
}
