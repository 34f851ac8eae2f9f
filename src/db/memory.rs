use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::models::{NewSpot, NewUser, ParkingSpot, User};
use crate::db::repository::{IdentityStore, RoleStore, SpotRepository};
use crate::error::DatabaseError;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    roles: HashMap<i64, String>,
    spots: Vec<ParkingSpot>,
    next_user_id: i64,
    next_spot_id: i64,
}

impl Tables {
    fn insert_user(&mut self, user: NewUser) -> Result<User, DatabaseError> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Duplicate);
        }

        self.next_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: self.next_user_id,
            first_name: user.first_name,
            middle_name: user.middle_name,
            last_name: user.last_name,
            email: user.email,
            mobile_number: user.mobile_number,
            gender: user.gender,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
            is_active: true,
        };
        self.users.push(created.clone());
        Ok(created)
    }
}

/// Process-local store used by tests and when `database.url` is `memory://`.
///
/// Ids are assigned sequentially from 1, mirroring the Postgres sequences.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a spot row as-is, for seeding fixtures with a chosen availability.
    pub async fn insert_spot(&self, mut spot: ParkingSpot) -> ParkingSpot {
        let mut tables = self.tables.write().await;
        tables.next_spot_id += 1;
        spot.id = tables.next_spot_id;
        tables.spots.push(spot.clone());
        spot
    }

    pub async fn remove_identity(&self, id: i64) -> bool {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        tables.roles.remove(&id);
        tables.users.len() != before
    }
}

#[async_trait]
impl IdentityStore for InMemoryStore {
    async fn get_identity_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_identity_by_unique_key(&self, key: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == key).cloned())
    }

    async fn create_identity(&self, user: NewUser) -> Result<User, DatabaseError> {
        self.tables.write().await.insert_user(user)
    }

    async fn create_identity_with_role(&self, user: NewUser, role: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        let created = tables.insert_user(user)?;
        tables.roles.insert(created.id, role.to_string());
        Ok(created)
    }

    async fn list_identities(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.clone())
    }
}

#[async_trait]
impl RoleStore for InMemoryStore {
    async fn get_role_for_identity(&self, id: i64) -> Result<Option<String>, DatabaseError> {
        Ok(self.tables.read().await.roles.get(&id).cloned())
    }

    async fn assign_role(&self, id: i64, role: &str) -> Result<(), DatabaseError> {
        self.tables.write().await.roles.insert(id, role.to_string());
        Ok(())
    }
}

#[async_trait]
impl SpotRepository for InMemoryStore {
    async fn list_available_spots(&self, limit: i64) -> Result<Vec<ParkingSpot>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .spots
            .iter()
            .filter(|s| s.is_available && s.is_active)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn create_spot(&self, spot: NewSpot) -> Result<ParkingSpot, DatabaseError> {
        let now = Utc::now();
        let row = ParkingSpot {
            id: 0,
            title: Some(spot.resolved_title()),
            description: spot.description,
            location: spot.location,
            latitude: spot.latitude,
            longitude: spot.longitude,
            price_per_hour: spot.price_per_hour,
            parking_type: spot.parking_type,
            is_available: true,
            owner_id: Some(spot.owner_id),
            max_vehicle_size: spot.max_vehicle_size,
            contact_phone: spot.contact_phone,
            availability_hours: spot.availability_hours,
            created_at: now,
            updated_at: now,
            is_active: true,
        };
        Ok(self.insert_spot(row).await)
    }
}
