//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::CookieConfig, credentials::CredentialStore, repositories::FilmStore,
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub films: Arc<dyn FilmStore>,
    pub credentials: CredentialStore,
    pub sessions: SessionManager,
    pub cookie: CookieConfig,
}
