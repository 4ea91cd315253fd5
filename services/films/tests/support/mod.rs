//! Shared helpers for router-level tests: an app wired to in-memory stores
//! with two provisioned users.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use films::{
    AppState,
    config::CookieConfig,
    create_router,
    credentials::{CredentialStore, hash_password},
    models::User,
    repositories::{FilmStore, InMemoryFilmStore, InMemoryUserStore},
    session::{InMemorySessionStore, SessionManager},
};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tower::util::ServiceExt;

pub const ALICE: (&str, &str) = ("john.doe@test.io", "password");
pub const BOB: (&str, &str) = ("mario.rossi@test.io", "password");

pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<InMemorySessionStore>,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

fn users() -> Vec<User> {
    static HASH: OnceLock<String> = OnceLock::new();
    let hash = HASH.get_or_init(|| hash_password("password").expect("Failed to hash password"));

    vec![
        User {
            id: 1,
            username: ALICE.0.to_string(),
            name: "John".to_string(),
            password_hash: hash.clone(),
        },
        User {
            id: 2,
            username: BOB.0.to_string(),
            name: "Mario".to_string(),
            password_hash: hash.clone(),
        },
    ]
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_films(Arc::new(InMemoryFilmStore::new()))
}

pub fn spawn_app_with_films(films: Arc<dyn FilmStore>) -> TestApp {
    let sessions = Arc::new(InMemorySessionStore::new());

    let state = AppState {
        films,
        credentials: CredentialStore::new(Arc::new(InMemoryUserStore::new(users()))),
        sessions: SessionManager::new(sessions.clone()),
        cookie: CookieConfig::default(),
    };

    TestApp {
        router: create_router(state),
        sessions,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        match body {
            Some(json) => {
                self.send_raw(method, uri, cookie, Some("application/json"), json.to_string())
                    .await
            }
            None => self.send_raw(method, uri, cookie, None, String::new()).await,
        }
    }

    /// Send a body verbatim, with an optional Content-Type
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        content_type: Option<&str>,
        body: String,
    ) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }

        let request = request.body(Body::from(body)).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        Reply {
            status,
            headers,
            body,
        }
    }

    /// Log in and return the `name=value` pair to send back as a Cookie header
    pub async fn login(&self, (username, password): (&str, &str)) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/sessions",
                None,
                Some(serde_json::json!({"username": username, "password": password})),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);

        session_cookie(&reply.headers).expect("login did not set a session cookie")
    }

    /// Create a film and return its id, found by title in the owner's list
    pub async fn create_film(&self, cookie: &str, film: Value) -> i64 {
        let title = film["title"].as_str().unwrap().to_string();
        let reply = self
            .send(Method::POST, "/api/films", Some(cookie), Some(film))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);

        let list = self.send(Method::GET, "/api/films", Some(cookie), None).await;
        list.body
            .as_array()
            .unwrap()
            .iter()
            .filter(|f| f["title"] == title.as_str())
            .filter_map(|f| f["id"].as_i64())
            .max()
            .unwrap()
    }
}

/// Extract `name=value` from the first Set-Cookie header
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.trim().to_string())
}

pub fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|f| f["title"].as_str().unwrap().to_string())
        .collect()
}
