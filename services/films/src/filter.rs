//! Named views over a user's film collection

use chrono::NaiveDate;
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::models::Film;

/// Films watched at most this many days ago count as "seen last month"
pub const SEEN_WINDOW_DAYS: i64 = 30;

/// Rating a film needs to show up under "Best Rated"
pub const BEST_RATING: i32 = 5;

/// The closed set of filters a client may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmFilter {
    All,
    Favorites,
    BestRated,
    SeenLastMonth,
    Unseen,
}

/// Filter name outside the known set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Undefined filter: {0}")]
pub struct UnknownFilter(pub String);

impl FilmFilter {
    pub const ALL: [FilmFilter; 5] = [
        FilmFilter::All,
        FilmFilter::Favorites,
        FilmFilter::BestRated,
        FilmFilter::SeenLastMonth,
        FilmFilter::Unseen,
    ];

    /// Wire name, as used in `/films/filter/{name}`
    pub fn name(self) -> &'static str {
        match self {
            FilmFilter::All => "All",
            FilmFilter::Favorites => "Favorites",
            FilmFilter::BestRated => "Best Rated",
            FilmFilter::SeenLastMonth => "Seen Last Month",
            FilmFilter::Unseen => "Unseen",
        }
    }

    /// Whether `film` belongs in this view, judged against `today`
    pub fn matches(self, film: &Film, today: NaiveDate) -> bool {
        match self {
            FilmFilter::All => true,
            FilmFilter::Favorites => film.fav,
            FilmFilter::BestRated => film.rating == BEST_RATING,
            FilmFilter::SeenLastMonth => film
                .date
                .is_some_and(|date| (today - date).num_days() <= SEEN_WINDOW_DAYS),
            FilmFilter::Unseen => film.date.is_none(),
        }
    }

    /// Keep the matching films, preserving their order
    pub fn apply(self, films: Vec<Film>, today: NaiveDate) -> Vec<Film> {
        films
            .into_iter()
            .filter(|film| self.matches(film, today))
            .collect()
    }
}

impl FromStr for FilmFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilmFilter::ALL
            .into_iter()
            .find(|filter| filter.name() == s)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

impl fmt::Display for FilmFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
