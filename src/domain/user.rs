//! User accounts and their password hashes.

use crate::error::AppError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub real_name: String,
    pub email: String,
}

impl User {
    pub fn new(id: i64, user_name: &str, real_name: &str, email: &str) -> Self {
        Self {
            id,
            user_name: user_name.to_string(),
            real_name: real_name.to_string(),
            email: email.to_string(),
        }
    }

    /// Map a `SELECT user_id, user_name, real_name, email` row.
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_name: row.get(1)?,
            real_name: row.get(2)?,
            email: row.get(3)?,
        })
    }
}

/// Setting names stored in `user_setting` and `user_gedcom_setting`.
pub mod preference {
    pub const IS_ADMINISTRATOR: &str = "canadmin";
    pub const IS_EMAIL_VERIFIED: &str = "verified";
    pub const IS_ACCOUNT_APPROVED: &str = "verified_by_admin";
    pub const TIME_ZONE: &str = "TIMEZONE";
    pub const LANGUAGE: &str = "language";
    pub const CONTACT_METHOD: &str = "contactmethod";

    /// Per-tree role: `none`, `access`, `edit`, `accept` or `admin`.
    pub const TREE_ROLE: &str = "canedit";
    /// Per-tree link from the account to an individual's xref.
    pub const TREE_ACCOUNT_XREF: &str = "gedcomid";

    pub const ROLE_MANAGER: &str = "admin";
    pub const ROLE_MODERATOR: &str = "accept";
}

/// Argon2id PHC string (`$argon2id$v=19$...`) with a random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Validation(format!("password hashing failed: {}", e)))
}

/// False for wrong passwords and for stored values that are not PHC strings.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies() {
        let h = hash_password("secret").unwrap();
        assert!(h.starts_with("$argon2id$"));
        assert!(verify_password("secret", &h));
        assert!(!verify_password("Secret", &h));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("x").unwrap(), hash_password("x").unwrap());
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("DEFAULT_USER", "DEFAULT_USER"));
        assert!(!verify_password("x", "sha256$10000$salt$abc"));
        assert!(!verify_password("x", ""));
    }
}
