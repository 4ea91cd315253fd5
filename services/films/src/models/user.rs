//! User model and related functionality

use serde::{Deserialize, Serialize};

/// Stable numeric user identifier; the owner of every film
pub type UserId = i64;

/// User entity, including its password verifier
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
    /// Argon2 PHC string; the salt is embedded in it
    pub password_hash: String,
}

/// Public view of a user, returned by login and whoami
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub username: String,
    pub name: String,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
        }
    }
}

/// User login credentials
///
/// A missing field reads as empty and simply fails verification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginCredentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
