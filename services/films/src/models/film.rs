//! Film models for the film library service

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::UserId;

/// Film identifier, assigned by the repository on creation
pub type FilmId = i64;

/// Film entity as stored and returned to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    pub id: FilmId,
    pub title: String,
    pub fav: bool,
    /// Watch date; `None` means the film has not been seen yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub rating: i32,
    #[serde(rename = "user")]
    pub owner: UserId,
}

impl Film {
    /// Materialise a stored film from a validated draft
    pub fn from_draft(id: FilmId, draft: &FilmDraft, owner: UserId) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            fav: draft.fav,
            date: draft.date,
            rating: draft.rating,
            owner,
        }
    }

    /// Overwrite every user-editable field, keeping id and owner
    pub fn overwrite(&mut self, draft: &FilmDraft) {
        self.title = draft.title.clone();
        self.fav = draft.fav;
        self.date = draft.date;
        self.rating = draft.rating;
    }
}

/// Validated film fields, without identifier or owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilmDraft {
    pub title: String,
    pub fav: bool,
    pub date: Option<NaiveDate>,
    pub rating: i32,
}

/// Single-field update applied by `PATCH /films/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmPatch {
    Favorite(bool),
    Rating(i32),
}

/// Raw create/replace body.
///
/// Fields are kept as loose JSON so that validation can report every
/// offending field at once instead of stopping at the first type error.
/// Any `id`, `user` or `owner` sent by the client is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilmPayload {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub fav: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
}

/// Raw patch body: `{"fav": bool}` or `{"rating": int}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilmPatchPayload {
    #[serde(default)]
    pub fav: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
}
