//! Session management
//!
//! A session is an opaque token mapped to a user id. The mapping lives in a
//! [`SessionStore`] injected at startup: an in-process map whose sessions
//! die with the process, or Redis when sessions should survive restarts.

use anyhow::Result;
use async_trait::async_trait;
use common::cache::RedisPool;
use rand::distributions::{Alphanumeric, DistString};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::{UserId, UserIdentity};

/// Length of a generated session token
pub const TOKEN_LENGTH: usize = 48;

/// Attempts at drawing an unused token before giving up
const MAX_TOKEN_ATTEMPTS: usize = 8;

/// Opaque session credential handed to the client
pub type SessionToken = String;

/// Session lookup failure
#[derive(Error, Debug)]
pub enum SessionError {
    /// No token, or a token that is not (or no longer) bound to a user
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The session store itself failed
    #[error("Session store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Storage for token → user bindings
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Bind `token` to `user_id` unless the token is already taken.
    /// Returns whether the binding was written.
    async fn insert_if_absent(&self, token: &str, user_id: UserId) -> Result<bool>;

    async fn get(&self, token: &str) -> Result<Option<UserId>>;

    /// Remove a binding; removing an unknown token is not an error
    async fn remove(&self, token: &str) -> Result<()>;
}

/// Session store held in process memory
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, UserId>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert_if_absent(&self, token: &str, user_id: UserId) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(token) {
            return Ok(false);
        }
        sessions.insert(token.to_string(), user_id);
        Ok(true)
    }

    async fn get(&self, token: &str) -> Result<Option<UserId>> {
        Ok(self.sessions.read().await.get(token).copied())
    }

    async fn remove(&self, token: &str) -> Result<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

/// Session store kept in Redis, expiring after a fixed TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(redis_pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            redis_pool,
            ttl_seconds,
        }
    }

    fn session_key(token: &str) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert_if_absent(&self, token: &str, user_id: UserId) -> Result<bool> {
        self.redis_pool
            .set_if_absent(
                &Self::session_key(token),
                &user_id.to_string(),
                Some(self.ttl_seconds),
            )
            .await
    }

    async fn get(&self, token: &str) -> Result<Option<UserId>> {
        let value = self.redis_pool.get(&Self::session_key(token)).await?;
        match value {
            Some(raw) => Ok(Some(raw.parse().map_err(|e| {
                anyhow::anyhow!("Corrupt session entry for user id {:?}: {}", raw, e)
            })?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, token: &str) -> Result<()> {
        self.redis_pool.delete(&Self::session_key(token)).await
    }
}

/// Session manager handing out and checking session tokens
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    /// Create a new session manager on top of `store`
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Open a session for a verified user and return its token
    pub async fn establish(&self, identity: &UserIdentity) -> Result<SessionToken> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = Alphanumeric.sample_string(&mut rand::thread_rng(), TOKEN_LENGTH);
            if self.store.insert_if_absent(&token, identity.id).await? {
                info!("Created session for user: {}", identity.id);
                return Ok(token);
            }
            warn!("Session token collision, drawing a new one");
        }

        anyhow::bail!(
            "Could not allocate a unique session token after {} attempts",
            MAX_TOKEN_ATTEMPTS
        )
    }

    /// Resolve a token to the user it was issued to
    pub async fn resolve(&self, token: Option<&str>) -> Result<UserId, SessionError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::Unauthenticated)?;

        self.store
            .get(token)
            .await?
            .ok_or(SessionError::Unauthenticated)
    }

    /// Drop a session; revoking an unknown token is a no-op
    pub async fn revoke(&self, token: &str) -> Result<()> {
        self.store.remove(token).await
    }
}
