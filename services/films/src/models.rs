//! API models for request and response payloads

pub mod film;
pub mod user;

pub use film::{Film, FilmDraft, FilmId, FilmPatch, FilmPatchPayload, FilmPayload};
pub use user::{LoginCredentials, User, UserId, UserIdentity};
