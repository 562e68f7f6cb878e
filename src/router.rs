use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use base64::Engine;

use crate::handlers::{auth, sales};
use crate::service::Dashboard;

#[derive(Clone)]
pub struct DashboardState {
    pub dashboard: Dashboard,
    pub key: Key,
    pub insecure_cookie: bool,
}

impl DashboardState {
    pub fn new(dashboard: Dashboard, key: Key, insecure_cookie: bool) -> Self {
        Self {
            dashboard,
            key,
            insecure_cookie,
        }
    }
}

/// Decode the configured cookie key, or generate a per-process one.
pub fn session_key(encoded: Option<&str>) -> Result<Key, Box<dyn std::error::Error>> {
    match encoded {
        Some(b64) => {
            let raw = base64::engine::general_purpose::STANDARD.decode(b64.trim())?;
            Ok(Key::try_from(raw.as_slice())?)
        }
        None => Ok(Key::generate()),
    }
}

impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.key.clone()
    }
}

pub fn dashboard_router(state: DashboardState, upload_limit_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/login", post(auth::login))
        .route("/api/session", get(auth::session))
        .route(
            "/api/upload",
            post(sales::upload).layer(DefaultBodyLimit::max(upload_limit_bytes)),
        )
        .route("/api/dashboard", get(sales::dashboard))
        .route("/api/dashboard/query", post(sales::query))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_key_of_64_bytes_is_accepted() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([7u8; 64]);
        assert!(session_key(Some(&encoded)).is_ok());
    }

    #[test]
    fn invalid_base64_key_is_an_error() {
        assert!(session_key(Some("not base64 at all!")).is_err());
    }

    #[test]
    fn short_key_is_an_error() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);
        assert!(session_key(Some(&encoded)).is_err());
    }

    #[test]
    fn missing_key_generates_one() {
        assert!(session_key(None).is_ok());
    }
}
