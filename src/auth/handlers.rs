use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::auth::principal::ROLE_ADMIN;
use crate::auth::service::SignupRequest;
use crate::db::models::ParkingSpot;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user_id: i64,
    pub email: String,
    pub role: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SpotSummary {
    pub id: i64,
    pub title: Option<String>,
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_hour: f64,
    pub parking_type: Option<String>,
    pub is_available: bool,
    pub max_vehicle_size: String,
    pub availability_hours: String,
}

impl From<ParkingSpot> for SpotSummary {
    fn from(spot: ParkingSpot) -> Self {
        Self {
            id: spot.id,
            title: spot.title,
            location: spot.location,
            latitude: spot.latitude,
            longitude: spot.longitude,
            price_per_hour: spot.price_per_hour,
            parking_type: spot.parking_type,
            is_available: spot.is_available,
            max_vehicle_size: spot.max_vehicle_size,
            availability_hours: spot.availability_hours,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub id: i64,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_spot: Option<SpotSummary>,
}

/// `PUT /user`
pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = req.into_inner();
    let (email, password) = match (email.filter(|e| !e.is_empty()), password.filter(|p| !p.is_empty())) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(AppError::ValidationError("Email and password are required".into())),
    };

    info!("Received login request for email: {}", email);
    match state.auth_service.login(&email, &password, Utc::now()).await {
        Ok(outcome) => {
            info!("Login successful for user {}", outcome.user_id);
            Ok(HttpResponse::Ok().json(LoginResponse {
                message: "Login successful",
                user_id: outcome.user_id,
                email: outcome.email,
                role: outcome.role,
                token: outcome.token,
            }))
        }
        Err(e) => {
            warn!("Login failed for email: {}: {}", email, e);
            Err(e)
        }
    }
}

/// `POST /user/signup`
pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = req.into_inner();
    info!("Received signup request for email: {}", request.email);

    match state.auth_service.signup(request).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(SignupResponse {
            message: "User created successfully",
            id: outcome.user.id,
            email: outcome.user.email,
            role: outcome.role,
            generated_password: outcome.generated_password,
            parking_spot: outcome.parking_spot.map(SpotSummary::from),
        })),
        Err(e) => {
            error!("Signup failed: {}", e);
            Err(e)
        }
    }
}

/// `GET /user`, admins only.
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let principal = state.auth_gate.authorize_request(&req, &[ROLE_ADMIN]).await?;
    info!("User list requested by {}", principal.identity_id);

    let users = state.auth_service.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}
