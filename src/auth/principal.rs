use serde::Serialize;

/// Role given to identities without a role row.
pub const ROLE_SEEKER: &str = "seeker";
pub const ROLE_PROVIDER: &str = "provider";
pub const ROLE_ADMIN: &str = "admin";

/// The authenticated identity and role for a single request.
///
/// Built by the token codec and the gate; stored in the request extensions
/// and dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub identity_id: i64,
    pub role: String,
}

impl Principal {
    pub fn new(identity_id: i64, role: impl Into<String>) -> Self {
        Self {
            identity_id,
            role: role.into(),
        }
    }

    pub fn has_any_role(&self, allowed_roles: &[&str]) -> bool {
        allowed_roles.iter().any(|r| *r == self.role)
    }
}
