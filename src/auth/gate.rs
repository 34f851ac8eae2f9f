use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::principal::{Principal, ROLE_SEEKER};
use crate::auth::token::TokenCodec;
use crate::db::repository::{IdentityStore, RoleStore};
use crate::error::{AppError, AuthError};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Role gate for protected routes.
///
/// Handlers call [`AuthGate::authorize_request`] first and only run their
/// body on `Ok`. Checks run in a fixed order (header, token, identity, role)
/// and stop at the first failure, so a request without a header never touches
/// the stores.
#[derive(Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    identities: Arc<dyn IdentityStore>,
    roles: Arc<dyn RoleStore>,
}

impl AuthGate {
    pub fn new(
        codec: Arc<TokenCodec>,
        identities: Arc<dyn IdentityStore>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        Self {
            codec,
            identities,
            roles,
        }
    }

    /// An empty `allowed_roles` admits any authenticated identity.
    pub async fn authorize(
        &self,
        raw_header: Option<&str>,
        allowed_roles: &[&str],
        now: DateTime<Utc>,
    ) -> Result<Principal, AppError> {
        let token = raw_header
            .and_then(|h| h.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthError::MissingToken)?;

        let claims = self.codec.decode(token, now).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::InvalidOrExpiredToken
        })?;

        let identity = self
            .identities
            .get_identity_by_id(claims.identity_id)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        let role = self
            .roles
            .get_role_for_identity(identity.id)
            .await?
            .unwrap_or_else(|| ROLE_SEEKER.to_string());

        let principal = Principal::new(identity.id, role);
        if !allowed_roles.is_empty() && !principal.has_any_role(allowed_roles) {
            return Err(AuthError::AccessDenied.into());
        }

        Ok(principal)
    }

    /// Authorize an actix request and attach the principal to its extensions.
    pub async fn authorize_request(
        &self,
        req: &HttpRequest,
        allowed_roles: &[&str],
    ) -> Result<Principal, AppError> {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match self.authorize(header, allowed_roles, Utc::now()).await {
            Ok(principal) => {
                req.extensions_mut().insert(principal.clone());
                Ok(principal)
            }
            Err(e) => {
                warn!("Rejected request to {}: {}", req.path(), e);
                Err(e)
            }
        }
    }
}
