//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings. Rows written by older releases hold the
//! plaintext password; [`verify`] still accepts those and [`needs_rehash`]
//! tells the caller to upgrade them.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::errors::AppResult;

pub fn hash(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// True when `stored` is a PHC hash string rather than legacy plaintext.
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with('$') && PasswordHash::new(stored).is_ok()
}

pub fn needs_rehash(stored: &str) -> bool {
    !is_hashed(stored)
}

/// Check `password` against the stored value.
pub fn verify(password: &str, stored: &str) -> AppResult<bool> {
    if !is_hashed(stored) {
        return Ok(!stored.is_empty() && stored == password);
    }

    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let h = hash("s3cret").unwrap();
        assert!(h.starts_with("$argon2id$"));
        assert!(verify("s3cret", &h).unwrap());
        assert!(!verify("nope", &h).unwrap());
    }

    #[test]
    fn legacy_plaintext_still_verifies() {
        assert!(verify("admin", "admin").unwrap());
        assert!(!verify("Admin", "admin").unwrap());
        assert!(needs_rehash("admin"));
    }

    #[test]
    fn empty_stored_password_never_matches() {
        assert!(!verify("", "").unwrap());
    }
}
