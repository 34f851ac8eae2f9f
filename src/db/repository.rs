//! Collaborator traits the auth and search core depend on.
//!
//! `DbOperations` implements them over Postgres and `InMemoryStore` over
//! process memory. Implementations own their concurrency safety.

use async_trait::async_trait;

use crate::db::models::{NewSpot, NewUser, ParkingSpot, User};
use crate::error::DatabaseError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_identity_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    /// Lookup by the unique login key (the email address).
    async fn get_identity_by_unique_key(&self, key: &str) -> Result<Option<User>, DatabaseError>;

    async fn create_identity(&self, user: NewUser) -> Result<User, DatabaseError>;

    /// Create the identity and its role row as one write: either both exist
    /// afterwards or neither does.
    async fn create_identity_with_role(&self, user: NewUser, role: &str) -> Result<User, DatabaseError>;

    async fn list_identities(&self) -> Result<Vec<User>, DatabaseError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// `None` when the identity has no role row; callers fall back to the baseline role.
    async fn get_role_for_identity(&self, id: i64) -> Result<Option<String>, DatabaseError>;

    /// Replaces any role the identity already has.
    async fn assign_role(&self, id: i64, role: &str) -> Result<(), DatabaseError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotRepository: Send + Sync {
    /// Available, active spots, at most `limit` of them, in id order.
    async fn list_available_spots(&self, limit: i64) -> Result<Vec<ParkingSpot>, DatabaseError>;

    async fn create_spot(&self, spot: NewSpot) -> Result<ParkingSpot, DatabaseError>;
}
