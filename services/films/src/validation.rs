//! Input validation for film payloads
//!
//! Create and replace bodies are checked field by field and every violation
//! is reported together. Patch bodies resolve to a [`FilmPatch`], with a
//! rating always winning over a favorite flag sent in the same call.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

use crate::models::{FilmDraft, FilmPatch, FilmPatchPayload, FilmPayload};

pub const MIN_RATING: i64 = 0;
pub const MAX_RATING: i64 = 5;

/// One rejected field of a request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate title
pub fn validate_title(title: Option<&Value>) -> Result<String, String> {
    match title {
        None => Err("Title is required".to_string()),
        Some(Value::String(s)) if s.is_empty() => Err("Title must not be empty".to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err("Title must be a string".to_string()),
    }
}

/// Validate favorite flag
pub fn validate_fav(fav: Option<&Value>) -> Result<bool, String> {
    match fav {
        None => Err("Favorite flag is required".to_string()),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err("Favorite flag must be a boolean".to_string()),
    }
}

/// Validate rating
pub fn validate_rating(rating: Option<&Value>) -> Result<i32, String> {
    let value = rating.ok_or_else(|| "Rating is required".to_string())?;

    let rating = value
        .as_i64()
        .ok_or_else(|| "Rating must be an integer".to_string())?;

    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        ));
    }

    // Bounded by the range check above.
    Ok(rating as i32)
}

/// Validate watch date; absence means the film is unseen
pub fn validate_date(date: Option<&Value>) -> Result<Option<NaiveDate>, String> {
    let raw = match date {
        None => return Ok(None),
        Some(Value::String(s)) => s,
        Some(_) => return Err("Date must be a string in YYYY-MM-DD format".to_string()),
    };

    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DATE_REGEX
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Failed to compile date regex"));

    if !regex.is_match(raw) {
        return Err("Date must be in YYYY-MM-DD format".to_string());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("{} is not a valid calendar date", raw))
}

/// Validate a create/replace body, collecting every field error
pub fn validate_draft(payload: &FilmPayload) -> Result<FilmDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = validate_title(payload.title.as_ref())
        .map_err(|e| errors.push(FieldError::new("title", e)))
        .ok();
    let fav = validate_fav(payload.fav.as_ref())
        .map_err(|e| errors.push(FieldError::new("fav", e)))
        .ok();
    let rating = validate_rating(payload.rating.as_ref())
        .map_err(|e| errors.push(FieldError::new("rating", e)))
        .ok();
    let date = validate_date(payload.date.as_ref())
        .map_err(|e| errors.push(FieldError::new("date", e)))
        .ok();

    match (title, fav, rating, date) {
        (Some(title), Some(fav), Some(rating), Some(date)) if errors.is_empty() => Ok(FilmDraft {
            title,
            fav,
            date,
            rating,
        }),
        _ => Err(errors),
    }
}

/// Validate a patch body and resolve it to a single-field update.
///
/// Each supplied field must be well formed. When both are supplied the
/// rating is applied and the favorite flag is dropped.
pub fn validate_patch(payload: &FilmPatchPayload) -> Result<FilmPatch, Vec<FieldError>> {
    let mut errors = Vec::new();

    let fav = payload.fav.as_ref().and_then(|v| {
        validate_fav(Some(v))
            .map_err(|e| errors.push(FieldError::new("fav", e)))
            .ok()
    });
    let rating = payload.rating.as_ref().and_then(|v| {
        validate_rating(Some(v))
            .map_err(|e| errors.push(FieldError::new("rating", e)))
            .ok()
    });

    if !errors.is_empty() {
        return Err(errors);
    }

    match (rating, fav) {
        (Some(rating), _) => Ok(FilmPatch::Rating(rating)),
        (None, Some(fav)) => Ok(FilmPatch::Favorite(fav)),
        (None, None) => Err(vec![FieldError::new(
            "fav",
            "Either fav or rating must be provided",
        )]),
    }
}
