//! Username/password verification

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use common::error::DatabaseResult;
use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn};

use crate::{
    models::{UserId, UserIdentity},
    repositories::UserStore,
};

/// Hash a password into an Argon2 PHC string with a fresh salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Check `password` against a stored PHC string.
///
/// A verifier that cannot be parsed never matches.
fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to parse password hash: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Verifier burned on unknown usernames so both failure paths cost the same
fn dummy_verifier() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("film-library-dummy-password").ok())
        .as_deref()
}

/// Run an Argon2 check on the blocking pool.
/// A task that fails to complete counts as a mismatch.
async fn verify_blocking<F>(check: F) -> bool
where
    F: FnOnce() -> bool + Send + 'static,
{
    tokio::task::spawn_blocking(check).await.unwrap_or_else(|e| {
        error!("Password verification task failed: {}", e);
        false
    })
}

/// Credential store in front of the user accounts
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Verify a username/password pair.
    ///
    /// Returns `None` both for an unknown username and for a wrong password.
    pub async fn verify(&self, username: &str, password: &str) -> DatabaseResult<Option<UserIdentity>> {
        let password = password.to_string();

        let Some(user) = self.users.find_by_username(username).await? else {
            verify_blocking(move || {
                if let Some(dummy) = dummy_verifier() {
                    verify_password(&password, dummy);
                }
                false
            })
            .await;
            warn!("Login rejected for unknown user");
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        if verify_blocking(move || verify_password(&password, &password_hash)).await {
            info!("User {} logged in", user.id);
            Ok(Some(UserIdentity::from(&user)))
        } else {
            warn!("Login rejected for user {}", user.id);
            Ok(None)
        }
    }

    /// Public identity of an existing user
    pub async fn identity(&self, id: UserId) -> DatabaseResult<Option<UserIdentity>> {
        let user = self.users.find_by_id(id).await?;
        Ok(user.as_ref().map(UserIdentity::from))
    }
}
