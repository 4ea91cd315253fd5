//! Personal film library service
//!
//! Authenticated users keep a catalog of films (title, watch date, rating,
//! favorite flag) and browse it through a handful of named filters.

pub mod config;
pub mod credentials;
pub mod error;
pub mod filter;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;
