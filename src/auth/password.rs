use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{AppError, AppResult};

/// Hash a password with Argon2 and a fresh random salt. The result is a PHC
/// string that embeds the salt and parameters.
pub fn hash_password(plain_text: &str) -> AppResult<String> {
    if plain_text.is_empty() {
        return Err(AppError::validation("Password must not be empty."));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain_text.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Password hash failed: {e}")))
}

/// Check a password against a stored hash. A malformed hash never verifies.
pub fn verify_password(plain_text: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
            false
        }
    }
}
