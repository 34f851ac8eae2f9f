//! Data access for users, roles and parking spots.
//!
//! The auth and search code only sees the traits in [`repository`]; the
//! Postgres and in-memory adapters implement them.

pub mod memory;
pub mod models;
pub mod operations;
pub mod repository;

pub use memory::InMemoryStore;
pub use models::{NewSpot, NewUser, ParkingSpot, User};
pub use operations::DbOperations;
pub use repository::{IdentityStore, RoleStore, SpotRepository};
