//! Repositories for database operations

pub mod film;
pub mod user;

pub use film::{FilmStore, InMemoryFilmStore, PgFilmRepository};
pub use user::{InMemoryUserStore, PgUserRepository, UserStore};
