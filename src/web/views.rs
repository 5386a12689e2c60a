//! Request handlers.

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, info, warn};

use super::error::AppError;
use super::pages;
use super::session::{found, requested_path, safe_next, AuthUser, Viewer, USER_ID_KEY};
use super::{edit_url, AppState, ADD_URL, HOME_URL, LOGIN_URL, SUCCESS_URL};
use crate::entity::{Note, User, UserId};
use crate::error::NotesError;
use crate::forms::{FormError, FormErrors, LoginForm, NoteForm, SignupForm};
use crate::policy::{authorize, Access, Action};
use crate::storage::SqliteStore;

type ViewResult = Result<Response, AppError>;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

// --- Public pages ---

pub async fn home(viewer: Viewer) -> Html<String> {
    Html(pages::home(viewer.0.as_ref()))
}

pub async fn login_page(Query(query): Query<NextQuery>) -> Html<String> {
    Html(pages::login("", query.next.as_deref(), &FormErrors::new()))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> ViewResult {
    let rejected = |errors: &FormErrors| {
        Html(pages::login(&form.username, form.next.as_deref(), errors)).into_response()
    };

    let username = match form.clean() {
        Ok(username) => username.to_string(),
        Err(errors) => return Ok(rejected(&errors)),
    };
    let user = state.store.lock().await.get_user_by_username(&username)?;

    let verifying = form.clone();
    let verified = tokio::task::spawn_blocking(move || verifying.verify(user))
        .await
        .map_err(|e| NotesError::Password(format!("verification task failed: {}", e)))?;
    let user = match verified {
        Ok(user) => user,
        Err(FormError::Invalid(errors)) => {
            debug!(username = %username, "login rejected");
            return Ok(rejected(&errors));
        }
        Err(FormError::Failed(e)) => return Err(e.into()),
    };

    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;
    info!(user = %user.username, "user logged in");

    let target = safe_next(form.next.as_deref()).unwrap_or(HOME_URL);
    Ok(found(target))
}

pub async fn logout(session: Session) -> ViewResult {
    if let Some(user_id) = session.get::<UserId>(USER_ID_KEY).await? {
        info!(user_id, "user logged out");
    }
    session.flush().await?;
    Ok(Html(pages::logged_out()).into_response())
}

pub async fn signup_page() -> Html<String> {
    Html(pages::signup("", &FormErrors::new()))
}

pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> ViewResult {
    let store = state.store.lock().await;
    match form.save(&store) {
        Ok(user) => {
            info!(user = %user.username, "account created");
            Ok(found(LOGIN_URL))
        }
        Err(FormError::Invalid(errors)) => Ok(Html(pages::signup(&form.username, &errors)).into_response()),
        Err(FormError::Failed(e)) => Err(e.into()),
    }
}

// --- Signed-in pages ---

pub async fn note_list(State(state): State<AppState>, AuthUser(user): AuthUser) -> ViewResult {
    let notes = state.store.lock().await.list_notes_by_author(user.id)?;
    Ok(Html(pages::note_list(&user, &notes)).into_response())
}

pub async fn add_page(AuthUser(user): AuthUser) -> Html<String> {
    Html(pages::note_form(&user, "Add note", ADD_URL, &NoteForm::default(), &FormErrors::new()))
}

pub async fn add_note(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(form): Form<NoteForm>,
) -> ViewResult {
    let store = state.store.lock().await;
    match form.save_new(&store, user.id) {
        Ok(note) => {
            info!(user = %user.username, slug = %note.slug, id = note.id, "note created");
            Ok(found(SUCCESS_URL))
        }
        Err(FormError::Invalid(errors)) => {
            Ok(Html(pages::note_form(&user, "Add note", ADD_URL, &form, &errors)).into_response())
        }
        Err(FormError::Failed(e)) => Err(e.into()),
    }
}

pub async fn success(AuthUser(user): AuthUser) -> Html<String> {
    Html(pages::success(&user))
}

// --- Author-only pages ---

/// Resolve `slug` and check that `viewer` may perform `action` on it
fn owned_note(
    store: &SqliteStore,
    viewer: Option<&User>,
    slug: &str,
    action: Action,
    uri: &Uri,
) -> Result<Note, AppError> {
    // Anonymous visitors are redirected before the slug is even looked up.
    let note = match viewer {
        Some(_) => store.get_note_by_slug(slug)?,
        None => None,
    };
    match authorize(viewer, note.as_ref(), action) {
        Access::Granted => note.ok_or(AppError::NotFound),
        Access::LoginRequired => Err(AppError::LoginRequired(requested_path(uri))),
        Access::NotFound => {
            if let Some(user) = viewer {
                warn!(user = %user.username, slug, %action, "note access denied");
            }
            Err(AppError::NotFound)
        }
    }
}

pub async fn note_detail(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(slug): Path<String>,
    uri: Uri,
) -> ViewResult {
    let store = state.store.lock().await;
    let note = owned_note(&store, viewer.as_ref(), &slug, Action::ViewDetail, &uri)?;
    let user = require(viewer)?;
    Ok(Html(pages::note_detail(&user, &note)).into_response())
}

pub async fn edit_page(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(slug): Path<String>,
    uri: Uri,
) -> ViewResult {
    let store = state.store.lock().await;
    let note = owned_note(&store, viewer.as_ref(), &slug, Action::Edit, &uri)?;
    let user = require(viewer)?;
    let form = NoteForm::from_note(&note);
    Ok(Html(pages::note_form(&user, "Edit note", &edit_url(&slug), &form, &FormErrors::new())).into_response())
}

/// The body is decoded only once access is granted, so anonymous and
/// foreign requests get the redirect or 404 whatever they send.
pub async fn edit_note(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(slug): Path<String>,
    uri: Uri,
    form: Result<Form<NoteForm>, FormRejection>,
) -> ViewResult {
    let store = state.store.lock().await;
    let note = owned_note(&store, viewer.as_ref(), &slug, Action::Edit, &uri)?;
    let user = require(viewer)?;
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return Ok(rejection.into_response()),
    };
    match form.save_edit(&store, &note) {
        Ok(updated) => {
            info!(user = %user.username, id = updated.id, slug = %updated.slug, "note updated");
            Ok(found(SUCCESS_URL))
        }
        Err(FormError::Invalid(errors)) => {
            Ok(Html(pages::note_form(&user, "Edit note", &edit_url(&slug), &form, &errors)).into_response())
        }
        Err(FormError::Failed(e)) => Err(e.into()),
    }
}

pub async fn delete_page(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(slug): Path<String>,
    uri: Uri,
) -> ViewResult {
    let store = state.store.lock().await;
    let note = owned_note(&store, viewer.as_ref(), &slug, Action::Delete, &uri)?;
    let user = require(viewer)?;
    Ok(Html(pages::delete_confirm(&user, &note)).into_response())
}

pub async fn delete_note(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(slug): Path<String>,
    uri: Uri,
) -> ViewResult {
    let store = state.store.lock().await;
    let note = owned_note(&store, viewer.as_ref(), &slug, Action::Delete, &uri)?;
    store.delete_note(note.id)?;
    info!(id = note.id, slug = %note.slug, "note deleted");
    Ok(found(SUCCESS_URL))
}

pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(pages::not_found()))
}

/// Unwrap the viewer after [`owned_note`] has granted access
fn require(viewer: Option<User>) -> Result<User, AppError> {
    viewer.ok_or(AppError::NotFound)
}
