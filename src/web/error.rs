use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use super::pages;
use super::session::{found, login_redirect_url};
use crate::error::NotesError;

/// Ways a request can end other than the handler's normal response.
#[derive(Debug)]
pub enum AppError {
    /// Missing note, or a note the viewer does not own.
    NotFound,
    /// Anonymous request for a protected page; carries the requested path.
    LoginRequired(String),
    Internal(NotesError),
}

impl From<NotesError> for AppError {
    fn from(e: NotesError) -> Self {
        AppError::Internal(e)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Internal(NotesError::Session(e.to_string()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, Html(pages::not_found())).into_response(),
            AppError::LoginRequired(next) => found(&login_redirect_url(&next)),
            AppError::Internal(e) => {
                error!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error())).into_response()
            }
        }
    }
}
