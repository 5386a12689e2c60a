//! HTTP front end: axum router, session handling and HTML views.

mod error;
mod pages;
mod session;
mod session_store;
mod views;

pub use error::AppError;
pub use session::{login_redirect_url, AuthUser, Viewer, SESSION_COOKIE, USER_ID_KEY};
pub use session_store::SqliteSessionStore;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use chrono::Duration;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::storage::SqliteStore;

pub const LOGIN_URL: &str = "/auth/login/";
pub const LOGOUT_URL: &str = "/auth/logout/";
pub const SIGNUP_URL: &str = "/auth/signup/";
pub const HOME_URL: &str = "/";
pub const LIST_URL: &str = "/notes/";
pub const ADD_URL: &str = "/add/";
pub const SUCCESS_URL: &str = "/done/";

pub fn detail_url(slug: &str) -> String {
    format!("/note/{}/", slug)
}

pub fn edit_url(slug: &str) -> String {
    format!("/edit/{}/", slug)
}

pub fn delete_url(slug: &str) -> String {
    format!("/delete/{}/", slug)
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<SqliteStore>>,
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(store: SqliteStore, session_ttl: Duration) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            session_ttl,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let sessions = session::session_layer(
        SqliteSessionStore::new(state.store.clone()),
        state.session_ttl,
    );
    Router::new()
        .route(HOME_URL, get(views::home))
        .route(LOGIN_URL, get(views::login_page).post(views::login))
        .route(LOGOUT_URL, get(views::logout).post(views::logout))
        .route(SIGNUP_URL, get(views::signup_page).post(views::signup))
        .route(LIST_URL, get(views::note_list))
        .route(ADD_URL, get(views::add_page).post(views::add_note))
        .route(SUCCESS_URL, get(views::success))
        .route("/note/{slug}/", get(views::note_detail))
        .route("/edit/{slug}/", get(views::edit_page).post(views::edit_note))
        .route(
            "/delete/{slug}/",
            get(views::delete_page)
                .post(views::delete_note)
                .delete(views::delete_note),
        )
        .fallback(views::not_found)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the database and serve HTTP until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<()> {
    let store = SqliteStore::open(&config.database)?;
    let purged = store.purge_expired_sessions()?;
    if purged > 0 {
        info!(purged, "removed expired sessions");
    }

    let app = router(AppState::new(store, config.session_ttl()?));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        addr = %config.bind,
        database = %config.database.display(),
        "slugnote listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
