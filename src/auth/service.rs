use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::password::{generate_password, PasswordHasher};
use crate::auth::principal::{ROLE_PROVIDER, ROLE_SEEKER};
use crate::auth::token::TokenCodec;
use crate::db::models::{NewSpot, NewUser, ParkingSpot, User};
use crate::db::repository::{IdentityStore, RoleStore, SpotRepository};
use crate::error::{AppError, AuthError};

const GENERATED_PASSWORD_LEN: usize = 12;
const SELF_ASSIGNABLE_ROLES: [&str; 2] = [ROLE_SEEKER, ROLE_PROVIDER];

#[derive(Debug, Serialize)]
pub struct LoginOutcome {
    pub user_id: i64,
    pub email: String,
    pub role: String,
    pub token: String,
}

/// Listing details a provider may send along with signup.
///
/// Form clients send the numeric fields as strings, so each accepts either a
/// JSON number or a string that parses as one.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ProviderListing {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub latitude: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub parking_type: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub hourly_rate: Option<f64>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub max_vehicle_size: Option<String>,
    pub contact_phone: Option<String>,
    pub availability_hours: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    pub password: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile_number: Option<String>,
    pub gender: Option<String>,
    #[serde(flatten)]
    pub listing: ProviderListing,
}

#[derive(Debug)]
pub struct SignupOutcome {
    pub user: User,
    pub role: String,
    /// Set only when the request carried no password.
    pub generated_password: Option<String>,
    pub parking_spot: Option<ParkingSpot>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

/// Login, signup and user listing on top of the stores, the password hasher
/// and the token codec.
pub struct AuthService {
    identities: Arc<dyn IdentityStore>,
    roles: Arc<dyn RoleStore>,
    spots: Arc<dyn SpotRepository>,
    codec: Arc<TokenCodec>,
    hasher: PasswordHasher,
    // Verified against when the email is unknown so both failure paths do the same work.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        roles: Arc<dyn RoleStore>,
        spots: Arc<dyn SpotRepository>,
        codec: Arc<TokenCodec>,
        hasher: PasswordHasher,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash(&generate_password(GENERATED_PASSWORD_LEN))?;

        Ok(Self {
            identities,
            roles,
            spots,
            codec,
            hasher,
            dummy_hash,
        })
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AppError> {
        let user = self.identities.get_identity_by_unique_key(email).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let matches = self.verify_blocking(password, stored_hash).await?;

        let user = match user {
            Some(user) if matches => user,
            _ => return Err(AuthError::InvalidCredentials.into()),
        };

        let role = self.resolve_role(user.id).await?;
        let token = self.codec.issue(user.id, &role, now)?;

        Ok(LoginOutcome {
            user_id: user.id,
            email: user.email,
            role,
            token,
        })
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<SignupOutcome, AppError> {
        let email = request.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::ValidationError("A valid email is required".into()));
        }

        let role = request.role.as_deref().unwrap_or(ROLE_SEEKER).to_string();
        if !SELF_ASSIGNABLE_ROLES.contains(&role.as_str()) {
            return Err(AppError::ValidationError(format!("Role '{}' cannot be requested at signup", role)));
        }

        let (password, generated_password) = match request.password.filter(|p| !p.is_empty()) {
            Some(password) => (password, None),
            None => {
                let password = generate_password(GENERATED_PASSWORD_LEN);
                (password.clone(), Some(password))
            }
        };

        let hasher = self.hasher;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let new_user = NewUser {
            first_name: request.first_name,
            middle_name: request.middle_name,
            last_name: request.last_name,
            email,
            mobile_number: request.mobile_number,
            gender: request.gender,
            password_hash,
        };
        let user = self.identities.create_identity_with_role(new_user, &role).await?;
        info!("Created user {} with role {}", user.id, role);

        let parking_spot = if role == ROLE_PROVIDER {
            self.create_listing(&user, request.listing).await
        } else {
            None
        };

        Ok(SignupOutcome {
            user,
            role,
            generated_password,
            parking_spot,
        })
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, AppError> {
        let users = self.identities.list_identities().await?;
        let mut summaries = Vec::with_capacity(users.len());
        for user in users {
            let role = self.resolve_role(user.id).await?;
            summaries.push(UserSummary {
                id: user.id,
                name: user.display_name(),
                email: user.email,
                role,
            });
        }
        Ok(summaries)
    }

    async fn resolve_role(&self, id: i64) -> Result<String, AppError> {
        Ok(self
            .roles
            .get_role_for_identity(id)
            .await?
            .unwrap_or_else(|| ROLE_SEEKER.to_string()))
    }

    async fn verify_blocking(&self, password: &str, stored_hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher;
        let password = password.to_string();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash)).await?)
    }

    /// A failed listing does not undo the signup.
    async fn create_listing(&self, user: &User, listing: ProviderListing) -> Option<ParkingSpot> {
        let (latitude, longitude) = match (listing.latitude, listing.longitude) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return None,
        };
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            warn!("Skipping listing for user {}: coordinates out of range", user.id);
            return None;
        }

        let mut spot = NewSpot::new(user.id, latitude, longitude);
        spot.title = listing.title;
        spot.description = listing.description;
        spot.location = listing.address;
        spot.parking_type = listing.parking_type;
        spot.price_per_hour = listing.hourly_rate.unwrap_or(0.0);
        spot.contact_phone = listing.contact_phone.or_else(|| user.mobile_number.clone());
        if let Some(size) = listing.max_vehicle_size.filter(|s| !s.is_empty()) {
            spot.max_vehicle_size = size;
        }
        if let Some(hours) = listing.availability_hours.filter(|h| !h.is_empty()) {
            spot.availability_hours = hours;
        }

        match self.spots.create_spot(spot).await {
            Ok(created) => {
                info!("Created parking spot {} for user {}", created.id, user.id);
                Some(created)
            }
            Err(e) => {
                error!("Error creating parking spot for user {}: {}", user.id, e);
                None
            }
        }
    }
}
