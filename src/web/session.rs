//! Login state carried by `tower-sessions` and the extractors built on it.

use axum::extract::FromRequestParts;
use axum::http::header::LOCATION;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use chrono::Duration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, Session, SessionManagerLayer};

use super::error::AppError;
use super::session_store::SqliteSessionStore;
use super::{AppState, LOGIN_URL};
use crate::entity::{User, UserId};
use crate::error::NotesError;

pub const SESSION_COOKIE: &str = "sessionid";

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";

/// `sessionid` cookie: HTTP-only, `SameSite=Lax`, expiring after `ttl` of inactivity
pub fn session_layer(
    store: SqliteSessionStore,
    ttl: Duration,
) -> SessionManagerLayer<SqliteSessionStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_always_save(true)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(ttl.num_seconds())))
}

/// The signed-in user, if any. Never rejects for anonymous requests.
pub struct Viewer(pub Option<User>);

/// A signed-in user. Anonymous requests are redirected to the login page.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = request_session(parts)?;
        let Some(user_id) = session.get::<UserId>(USER_ID_KEY).await? else {
            return Ok(Viewer(None));
        };
        let user = state.store.lock().await.get_user(user_id)?;
        Ok(Viewer(user))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Viewer::from_request_parts(parts, state).await? {
            Viewer(Some(user)) => Ok(AuthUser(user)),
            Viewer(None) => Err(AppError::LoginRequired(requested_path(&parts.uri))),
        }
    }
}

fn request_session(parts: &Parts) -> Result<Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| NotesError::Session("session layer is not installed".to_string()).into())
}

/// Path and query of the request, used as the login `next` target
pub fn requested_path(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// `/auth/login/?next=<path>`, percent-encoding everything but `/`
pub fn login_redirect_url(next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("{}?next={}", LOGIN_URL, encoded)
}

/// Accept only same-site paths as a post-login destination
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

/// `302 Found` to `location`
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
