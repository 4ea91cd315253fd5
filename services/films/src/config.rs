//! Service configuration read from the environment

use anyhow::Result;
use std::{env, str::FromStr};

/// Where session tokens are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    /// In-process map; sessions end with the process
    Memory,
    /// Redis, with a TTL per session
    Redis,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "redis" => Ok(SessionBackend::Redis),
            _ => anyhow::bail!("Invalid session backend: {}", s),
        }
    }
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Cookie carrying the session token
    pub name: String,
    /// Only send the cookie over HTTPS
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "filmlib.sid".to_string(),
            secure: false,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    /// Session lifetime in seconds (Redis backend only)
    pub ttl_seconds: u64,
    pub cookie: CookieConfig,
}

/// Film service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Origin allowed to call the API with credentials, if any
    pub cors_allowed_origin: Option<String>,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `API_BIND_ADDR`: listen address (default: "0.0.0.0:3001")
    /// - `CORS_ALLOWED_ORIGIN`: browser origin allowed with credentials
    ///   (default: "http://localhost:3000"; empty disables CORS)
    /// - `SESSION_BACKEND`: "memory" or "redis" (default: "memory")
    /// - `SESSION_TTL_SECONDS`: session lifetime in Redis (default: 86400)
    /// - `SESSION_COOKIE_NAME`: session cookie name (default: "filmlib.sid")
    /// - `SESSION_COOKIE_SECURE`: "true" to mark the cookie Secure (default: false)
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());

        let cors_allowed_origin = match env::var("CORS_ALLOWED_ORIGIN") {
            Ok(origin) if origin.trim().is_empty() => None,
            Ok(origin) => Some(origin),
            Err(_) => Some("http://localhost:3000".to_string()),
        };

        let backend = env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()?;

        let ttl_seconds = env::var("SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86400);

        let defaults = CookieConfig::default();
        let cookie = CookieConfig {
            name: env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.name),
            secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.secure),
        };

        Ok(AppConfig {
            bind_addr,
            cors_allowed_origin,
            session: SessionConfig {
                backend,
                ttl_seconds,
                cookie,
            },
        })
    }
}
