//! Film service routes

use anyhow::Result;
use axum::{
    Extension, Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Local;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use crate::{
    error::{ApiError, ApiResult},
    filter::FilmFilter,
    middleware::{AuthUser, auth_middleware},
    models::{Film, FilmId, FilmPatchPayload, FilmPayload, LoginCredentials, UserIdentity},
    state::AppState,
    validation::{validate_draft, validate_patch},
};

/// Create the router for the film service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/films", get(list_films).post(create_film))
        .route("/films/filter/:filter", get(filter_films))
        .route(
            "/films/:id",
            get(get_film)
                .put(replace_film)
                .patch(patch_film)
                .delete(delete_film),
        )
        .route("/sessions/current", get(current_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .route("/sessions", post(login))
        .route("/sessions/current", delete(logout))
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy letting a browser client on `origin` call the API with cookies
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", origin, e))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "film-service"
    }))
}

/// List every film of the caller
pub async fn list_films(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Film>>> {
    let films = state.films.list_all(user.id).await?;
    Ok(Json(films))
}

/// List the caller's films matching a named filter
pub async fn filter_films(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(filter): Path<String>,
) -> ApiResult<Json<Vec<Film>>> {
    let filter: FilmFilter = filter.parse()?;

    let films = state.films.list_all(user.id).await?;
    let today = Local::now().date_naive();

    Ok(Json(filter.apply(films, today)))
}

/// Get a film by ID
pub async fn get_film(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<FilmId>, PathRejection>,
) -> ApiResult<Json<Film>> {
    let Path(id) = id?;
    let film = state.films.get(id, user.id).await?;
    Ok(Json(film))
}

/// Add a film to the caller's library
pub async fn create_film(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<FilmPayload>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(payload) = payload?;
    let draft = validate_draft(&payload).map_err(ApiError::ValidationFailed)?;

    let film = state
        .films
        .create(&draft, user.id)
        .await
        .map_err(ApiError::from_write)?;
    info!("Film {} created by user {}", film.id, user.id);

    Ok(StatusCode::CREATED)
}

/// Overwrite every field of an existing film
pub async fn replace_film(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<FilmId>, PathRejection>,
    payload: Result<Json<FilmPayload>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let draft = validate_draft(&payload).map_err(ApiError::ValidationFailed)?;

    state
        .films
        .replace(id, &draft, user.id)
        .await
        .map_err(ApiError::from_write)?;

    Ok(StatusCode::OK)
}

/// Change the favorite flag or the rating of a film
pub async fn patch_film(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<FilmId>, PathRejection>,
    payload: Result<Json<FilmPatchPayload>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let patch = validate_patch(&payload).map_err(ApiError::ValidationFailed)?;

    state
        .films
        .apply_patch(id, user.id, patch)
        .await
        .map_err(ApiError::from_write)?;

    Ok(StatusCode::OK)
}

/// Delete a film
pub async fn delete_film(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<FilmId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state
        .films
        .delete(id, user.id)
        .await
        .map_err(ApiError::from_write)?;

    Ok(StatusCode::NO_CONTENT)
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginCredentials>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<UserIdentity>)> {
    info!("Login attempt");

    let rejected =
        || ApiError::Unauthenticated("Incorrect username and/or password.".to_string());

    let Json(payload) = payload.map_err(|e| {
        debug!("Unreadable login body: {}", e.body_text());
        rejected()
    })?;

    let identity = state
        .credentials
        .verify(&payload.username, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to look up credentials: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(rejected)?;

    let token = state.sessions.establish(&identity).await.map_err(|e| {
        error!("Failed to store session: {}", e);
        ApiError::InternalServerError
    })?;

    let cookie = Cookie::build((state.cookie.name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(state.cookie.secure)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Json(identity)))
}

/// Logout endpoint
///
/// Always succeeds; a missing or stale cookie simply has nothing to revoke.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(cookie) = jar.get(&state.cookie.name) {
        if let Err(e) = state.sessions.revoke(cookie.value()).await {
            error!("Failed to revoke session: {}", e);
        }
    }

    let removal = Cookie::build((state.cookie.name.clone(), "")).path("/");
    (jar.remove(removal), StatusCode::OK)
}

/// Report who the current session belongs to
pub async fn current_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<UserIdentity>> {
    let identity = state
        .credentials
        .identity(user.id)
        .await
        .map_err(|e| {
            error!("Failed to load user {}: {}", user.id, e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::Unauthenticated("Unauthenticated user!".to_string()))?;

    Ok(Json(identity))
}
