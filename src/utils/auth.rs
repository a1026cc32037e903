//! Authentication utilities

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::{MIN_PASSWORD_LEN, PASSWORD_SYMBOLS};

#[cfg(not(test))]
const PBKDF2_ITERATIONS: u32 = 100_000;
#[cfg(test)]
const PBKDF2_ITERATIONS: u32 = 1_000;
const HASH_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Why a new password was refused. Variants are ordered as they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must be at least 8 characters long.")]
    TooShort,
    #[error("Password must contain at least one uppercase letter.")]
    MissingUppercase,
    #[error("Password must contain at least one lowercase letter.")]
    MissingLowercase,
    #[error("Password must contain at least one number.")]
    MissingDigit,
    #[error("Password must contain at least one special character.")]
    MissingSymbol,
    #[error("Passwords do not match.")]
    Mismatch,
}

/// Check a new password against the policy and its confirmation.
///
/// The first failing rule is returned.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(PasswordError::MissingSymbol);
    }
    if password != confirm {
        return Err(PasswordError::Mismatch);
    }
    Ok(())
}

fn derive(password: &str, salt: &str) -> String {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut hash);
    hex::encode(hash)
}

/// hash a password using pbkdf2-sha256 with a fresh salt, as `<salt>$<hex>`
pub fn hash_password(password: &str) -> String {
    let salt = generate_random_string(SALT_LENGTH);
    format!("{}${}", salt, derive(password, &salt))
}

/// verify a password against a stored credential using constant-time comparison
pub fn verify_password(password: &str, credential: &str) -> bool {
    let Some((salt, stored)) = credential.split_once('$') else {
        return false;
    };

    let computed = derive(password, salt);
    computed.as_bytes().ct_eq(stored.as_bytes()).into()
}

/// generate a random string of the given length
pub fn generate_random_string(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
