//! Film repository for database operations
//!
//! Every operation is scoped to an owner. A film that exists but belongs to
//! someone else is reported exactly like a film that does not exist.

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::{Film, FilmDraft, FilmId, FilmPatch, UserId};

fn film_not_found(id: FilmId) -> DatabaseError {
    DatabaseError::NotFound(format!("Film {}", id))
}

/// Durable store for films
#[async_trait]
pub trait FilmStore: Send + Sync {
    /// All films of `owner`; order is not guaranteed
    async fn list_all(&self, owner: UserId) -> DatabaseResult<Vec<Film>>;

    async fn get(&self, id: FilmId, owner: UserId) -> DatabaseResult<Film>;

    /// Persist a validated draft under a fresh identifier
    async fn create(&self, draft: &FilmDraft, owner: UserId) -> DatabaseResult<Film>;

    /// Overwrite title, favorite, date and rating of an owned film
    async fn replace(&self, id: FilmId, draft: &FilmDraft, owner: UserId) -> DatabaseResult<Film>;

    async fn patch_favorite(&self, id: FilmId, owner: UserId, fav: bool) -> DatabaseResult<()>;

    async fn patch_rating(&self, id: FilmId, owner: UserId, rating: i32) -> DatabaseResult<()>;

    async fn delete(&self, id: FilmId, owner: UserId) -> DatabaseResult<()>;

    async fn apply_patch(&self, id: FilmId, owner: UserId, patch: FilmPatch) -> DatabaseResult<()> {
        match patch {
            FilmPatch::Favorite(fav) => self.patch_favorite(id, owner, fav).await,
            FilmPatch::Rating(rating) => self.patch_rating(id, owner, rating).await,
        }
    }
}

/// Film repository backed by PostgreSQL
#[derive(Clone)]
pub struct PgFilmRepository {
    pool: PgPool,
}

impl PgFilmRepository {
    /// Create a new film repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn film_from_row(row: &PgRow) -> Film {
        Film {
            id: row.get("id"),
            title: row.get("title"),
            fav: row.get("favorite"),
            date: row.get("watchdate"),
            rating: row.get("rating"),
            owner: row.get("user_id"),
        }
    }
}

#[async_trait]
impl FilmStore for PgFilmRepository {
    async fn list_all(&self, owner: UserId) -> DatabaseResult<Vec<Film>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, favorite, watchdate, rating, user_id
            FROM films
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(rows.iter().map(Self::film_from_row).collect())
    }

    async fn get(&self, id: FilmId, owner: UserId) -> DatabaseResult<Film> {
        let row = sqlx::query(
            r#"
            SELECT id, title, favorite, watchdate, rating, user_id
            FROM films
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref()
            .map(Self::film_from_row)
            .ok_or_else(|| film_not_found(id))
    }

    async fn create(&self, draft: &FilmDraft, owner: UserId) -> DatabaseResult<Film> {
        info!("Creating film '{}' for user {}", draft.title, owner);

        let row = sqlx::query(
            r#"
            INSERT INTO films (title, favorite, watchdate, rating, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, favorite, watchdate, rating, user_id
            "#,
        )
        .bind(&draft.title)
        .bind(draft.fav)
        .bind(draft.date)
        .bind(draft.rating)
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(Self::film_from_row(&row))
    }

    async fn replace(&self, id: FilmId, draft: &FilmDraft, owner: UserId) -> DatabaseResult<Film> {
        info!("Replacing film {} for user {}", id, owner);

        let row = sqlx::query(
            r#"
            UPDATE films
            SET title = $1, favorite = $2, watchdate = $3, rating = $4
            WHERE id = $5 AND user_id = $6
            RETURNING id, title, favorite, watchdate, rating, user_id
            "#,
        )
        .bind(&draft.title)
        .bind(draft.fav)
        .bind(draft.date)
        .bind(draft.rating)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref()
            .map(Self::film_from_row)
            .ok_or_else(|| film_not_found(id))
    }

    async fn patch_favorite(&self, id: FilmId, owner: UserId, fav: bool) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE films SET favorite = $1 WHERE id = $2 AND user_id = $3")
            .bind(fav)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        if result.rows_affected() == 0 {
            return Err(film_not_found(id));
        }
        Ok(())
    }

    async fn patch_rating(&self, id: FilmId, owner: UserId, rating: i32) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE films SET rating = $1 WHERE id = $2 AND user_id = $3")
            .bind(rating)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        if result.rows_affected() == 0 {
            return Err(film_not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: FilmId, owner: UserId) -> DatabaseResult<()> {
        info!("Deleting film {} for user {}", id, owner);

        let result = sqlx::query("DELETE FROM films WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        if result.rows_affected() == 0 {
            return Err(film_not_found(id));
        }
        Ok(())
    }
}

#[derive(Default)]
struct FilmTable {
    next_id: FilmId,
    rows: BTreeMap<FilmId, Film>,
}

impl FilmTable {
    fn owned_mut(&mut self, id: FilmId, owner: UserId) -> DatabaseResult<&mut Film> {
        self.rows
            .get_mut(&id)
            .filter(|film| film.owner == owner)
            .ok_or_else(|| film_not_found(id))
    }
}

/// Film store kept in process memory; contents are lost on restart
#[derive(Default)]
pub struct InMemoryFilmStore {
    table: RwLock<FilmTable>,
}

impl InMemoryFilmStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FilmStore for InMemoryFilmStore {
    async fn list_all(&self, owner: UserId) -> DatabaseResult<Vec<Film>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|film| film.owner == owner)
            .cloned()
            .collect())
    }

    async fn get(&self, id: FilmId, owner: UserId) -> DatabaseResult<Film> {
        let table = self.table.read().await;
        table
            .rows
            .get(&id)
            .filter(|film| film.owner == owner)
            .cloned()
            .ok_or_else(|| film_not_found(id))
    }

    async fn create(&self, draft: &FilmDraft, owner: UserId) -> DatabaseResult<Film> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let film = Film::from_draft(table.next_id, draft, owner);
        table.rows.insert(film.id, film.clone());
        Ok(film)
    }

    async fn replace(&self, id: FilmId, draft: &FilmDraft, owner: UserId) -> DatabaseResult<Film> {
        let mut table = self.table.write().await;
        let film = table.owned_mut(id, owner)?;
        film.overwrite(draft);
        Ok(film.clone())
    }

    async fn patch_favorite(&self, id: FilmId, owner: UserId, fav: bool) -> DatabaseResult<()> {
        let mut table = self.table.write().await;
        table.owned_mut(id, owner)?.fav = fav;
        Ok(())
    }

    async fn patch_rating(&self, id: FilmId, owner: UserId, rating: i32) -> DatabaseResult<()> {
        let mut table = self.table.write().await;
        table.owned_mut(id, owner)?.rating = rating;
        Ok(())
    }

    async fn delete(&self, id: FilmId, owner: UserId) -> DatabaseResult<()> {
        let mut table = self.table.write().await;
        table.owned_mut(id, owner)?;
        table.rows.remove(&id);
        Ok(())
    }
}
