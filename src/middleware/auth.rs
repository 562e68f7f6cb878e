use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};

use crate::error::DashboardError;
use crate::session::SessionState;

pub const SESSION_COOKIE: &str = "dashboard_session";

/// Read the session carried by the private cookie. Missing, tampered or
/// undecodable cookies all read as unauthenticated.
pub fn load_session(jar: &PrivateCookieJar) -> SessionState {
    jar.get(SESSION_COOKIE)
        .and_then(|c| serde_json::from_str(c.value()).ok())
        .unwrap_or_default()
}

pub fn store_session(
    jar: PrivateCookieJar,
    session: &SessionState,
    insecure: bool,
) -> Result<PrivateCookieJar, serde_json::Error> {
    let value = serde_json::to_string(session)?;
    let cookie = Cookie::build(Cookie::new(SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(!insecure)
        .same_site(SameSite::Lax)
        .build();
    Ok(jar.add(cookie))
}

/// Extractor that rejects requests without an authenticated session.
#[derive(Debug, Clone)]
pub struct RequireSession(pub SessionState);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let session = load_session(&jar);
        if !session.is_authenticated() {
            return Err(DashboardError::Unauthenticated.into_response());
        }
        Ok(Self(session))
    }
}
