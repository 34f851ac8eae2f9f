use pbkdf2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use pbkdf2::{Algorithm, Params, Pbkdf2};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use tracing::warn;

use crate::error::AppError;

pub const DEFAULT_ITERATIONS: u32 = 200_000;
const SALT_LEN: usize = 16;
const OUTPUT_LEN: usize = 32;
const PBKDF2_SHA256_PREFIX: &str = "$pbkdf2-sha256$";

/// PBKDF2-SHA256 credential hashing.
///
/// Hashes are PHC strings (`$pbkdf2-sha256$i=..,l=32$salt$hash`), so the salt
/// and iteration count are stored with the hash and verification reads them
/// back from there.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        if iterations < DEFAULT_ITERATIONS {
            warn!("Password hashing configured with {} iterations, below {}", iterations, DEFAULT_ITERATIONS);
        }
        Self { iterations }
    }

    pub fn hash(&self, password_plain: &str) -> Result<String, AppError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AppError::InternalError(format!("Failed to encode salt: {}", e)))?;

        let params = Params {
            rounds: self.iterations,
            output_length: OUTPUT_LEN,
        };

        let hash = Pbkdf2
            .hash_password_customized(
                password_plain.as_bytes(),
                Some(Algorithm::Pbkdf2Sha256.ident()),
                None,
                params,
                &salt,
            )
            .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Constant-time check of `password_plain` against a stored PHC or passlib
    /// hash. A stored value that does not parse never verifies.
    pub fn verify(&self, password_plain: &str, hash_string: &str) -> bool {
        let converted = passlib_to_phc(hash_string);
        let hash_string = converted.as_deref().unwrap_or(hash_string);

        let parsed = match PasswordHash::new(hash_string) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash could not be parsed: {}", e);
                return false;
            }
        };

        Pbkdf2.verify_password(password_plain.as_bytes(), &parsed).is_ok()
    }
}

/// Rewrite passlib's `$pbkdf2-sha256$<rounds>$<salt>$<hash>` as the equivalent
/// PHC string. passlib's base64 uses `.` where PHC uses `+`, both unpadded.
fn passlib_to_phc(hash_string: &str) -> Option<String> {
    let rest = hash_string.strip_prefix(PBKDF2_SHA256_PREFIX)?;
    let mut fields = rest.split('$');
    let (rounds, salt, hash) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() || rounds.is_empty() || !rounds.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(format!(
        "{}i={}${}${}",
        PBKDF2_SHA256_PREFIX,
        rounds,
        salt.replace('.', "+"),
        hash.replace('.', "+")
    ))
}

/// Random alphanumeric password handed back when signup omits one.
pub fn generate_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
