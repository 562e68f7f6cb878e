use axum::{Json, extract::State};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::{Deserialize, Serialize};

use crate::middleware::auth::{load_session, store_session};
use crate::service::LoginOutcome;
use crate::{DashboardError, router::DashboardState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub authenticated: bool,
    pub username: Option<String>,
}

/// POST /api/login -> verifies credentials and stores the session in a private cookie.
pub async fn login(
    State(state): State<DashboardState>,
    jar: PrivateCookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(PrivateCookieJar, Json<LoginOutcome>), DashboardError> {
    let current = load_session(&jar);
    let (next, outcome) = state
        .dashboard
        .on_login(current, &req.username, &req.password)
        .await?;

    let jar = store_session(jar, &next, state.insecure_cookie)?;
    Ok((jar, Json(outcome)))
}

/// GET /api/session -> reports whether the caller is logged in.
pub async fn session(jar: PrivateCookieJar) -> Json<SessionInfo> {
    let session = load_session(&jar);
    Json(SessionInfo {
        authenticated: session.is_authenticated(),
        username: session.username().map(str::to_string),
    })
}
