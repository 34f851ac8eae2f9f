//! Authentication and role authorization.
//!
//! Tokens are stateless HS256 JWTs; passwords are PBKDF2-SHA256. Protected
//! handlers call [`AuthGate::authorize_request`] before doing any work.

pub mod gate;
pub mod handlers;
pub mod password;
pub mod principal;
pub mod service;
pub mod token;

pub use gate::AuthGate;
pub use password::PasswordHasher;
pub use principal::{Principal, ROLE_ADMIN, ROLE_PROVIDER, ROLE_SEEKER};
pub use service::{AuthService, LoginOutcome, SignupOutcome, SignupRequest};
pub use token::{Claims, TokenCodec, TokenError};
