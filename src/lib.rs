pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;

use std::sync::Arc;
use std::time::Duration;
use actix_web::{web, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthGate, AuthService, PasswordHasher, Principal, TokenCodec};
pub use db::{DbOperations, IdentityStore, InMemoryStore, RoleStore, SpotRepository};

const MEMORY_DATABASE_URL: &str = "memory://";

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Route table shared by the binary and the integration tests.
///
/// Extractor failures go through `AppError` so every rejection has the same
/// JSON body.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .route("/health", web::get().to(health_check))
    .route("/user", web::put().to(auth::handlers::login))
    .route("/user", web::get().to(auth::handlers::list_users))
    .route("/user/signup", web::post().to(auth::handlers::signup))
    .route("/user/signup/", web::post().to(auth::handlers::signup))
    .route("/api/parking-spots", web::get().to(geo::handlers::nearby_spots))
    .route("/api/parking-spots/", web::get().to(geo::handlers::nearby_spots));
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth_gate: Arc<AuthGate>,
    pub auth_service: Arc<AuthService>,
    pub identities: Arc<dyn IdentityStore>,
    pub spots: Arc<dyn SpotRepository>,
    db: Option<DbOperations>,
}

impl AppState {
    /// Connects to Postgres and applies migrations, or uses an in-memory
    /// store when `database.url` is `memory://`.
    pub async fn new(config: Settings) -> Result<Self> {
        if config.database.url == MEMORY_DATABASE_URL {
            info!("Using in-memory store");
            return Self::with_store(config, Arc::new(InMemoryStore::new()));
        }

        let db = DbOperations::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(5),
        )
        .await?;

        sqlx::migrate!("./migrations")
            .run(db.pool())
            .await
            .map_err(|e| AppError::DatabaseError(error::DatabaseError::QueryError(e.to_string())))?;
        info!("Database migrations applied");

        let store = Arc::new(db.clone());
        let mut state = Self::with_store(config, store)?;
        state.db = Some(db);
        Ok(state)
    }

    /// Build the state over a single store implementing every collaborator trait.
    pub fn with_store<S>(config: Settings, store: Arc<S>) -> Result<Self>
    where
        S: IdentityStore + RoleStore + SpotRepository + 'static,
    {
        Self::from_parts(config, store.clone(), store.clone(), store)
    }

    pub fn from_parts(
        config: Settings,
        identities: Arc<dyn IdentityStore>,
        roles: Arc<dyn RoleStore>,
        spots: Arc<dyn SpotRepository>,
    ) -> Result<Self> {
        let codec = Arc::new(TokenCodec::from_settings(&config.auth));
        let hasher = PasswordHasher::new(config.auth.password_iterations);

        let auth_gate = AuthGate::new(codec.clone(), identities.clone(), roles.clone());
        let auth_service = AuthService::new(
            identities.clone(),
            roles,
            spots.clone(),
            codec,
            hasher,
        )?;

        Ok(Self {
            config: Arc::new(config),
            auth_gate: Arc::new(auth_gate),
            auth_service: Arc::new(auth_service),
            identities,
            spots,
            db: None,
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(db) = &self.db {
            db.close().await;
        }
        Ok(())
    }
}
