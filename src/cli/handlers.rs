use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use crate::config::ServerConfig;
use crate::error::{NotesError, Result};
use crate::forms::{FormError, FormErrors, NoteForm, SignupForm};
use crate::storage::SqliteStore;
use crate::web;

/// Merge the optional config file with command-line overrides
pub fn resolve_config(
    config: Option<PathBuf>,
    database: Option<PathBuf>,
    bind: Option<SocketAddr>,
) -> Result<ServerConfig> {
    let mut resolved = match config {
        Some(path) => ServerConfig::load(&path)?,
        None => ServerConfig::default(),
    };
    if let Some(database) = database {
        resolved.database = database;
    }
    if let Some(bind) = bind {
        resolved.bind = bind;
    }
    resolved.validate()?;
    Ok(resolved)
}

pub fn handle_serve(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(web::serve(config))
}

pub fn handle_create_user(config: &ServerConfig, username: String, password: String) -> Result<()> {
    let store = SqliteStore::open(&config.database)?;

    let form = SignupForm {
        username,
        password1: password.clone(),
        password2: password,
    };
    let user = form.save(&store).map_err(form_failure)?;
    info!(user = %user.username, id = user.id, "account created");

    println!("Created user {} ({})", user.username, user.id);
    Ok(())
}

pub fn handle_add(
    config: &ServerConfig,
    title: String,
    author: String,
    text: String,
    slug: Option<String>,
    json: bool,
) -> Result<()> {
    let store = SqliteStore::open(&config.database)?;
    let user = store
        .get_user_by_username(&author)?
        .ok_or(NotesError::UserNotFound(author))?;

    let form = NoteForm::new(title, text, slug.unwrap_or_default());
    let note = form.save_new(&store, user.id).map_err(form_failure)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("Created note {:03} ({}) - {}", note.id, note.slug, note.title);
    }
    Ok(())
}

pub fn handle_list(config: &ServerConfig, author: Option<String>, json: bool) -> Result<()> {
    let store = SqliteStore::open(&config.database)?;

    let notes = match author {
        Some(username) => {
            let user = store
                .get_user_by_username(&username)?
                .ok_or(NotesError::UserNotFound(username))?;
            store.list_notes_by_author(user.id)?
        }
        None => store.list_notes()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
    } else if notes.is_empty() {
        println!("No notes found.");
    } else {
        println!("Notes:\n");
        for note in notes {
            println!("  {:03} ({}) {}", note.id, note.slug, note.title);
        }
    }
    Ok(())
}

/// Flatten form validation messages into a single CLI error
fn form_failure(e: FormError) -> NotesError {
    match e {
        FormError::Failed(e) => e,
        FormError::Invalid(errors) => match slug_conflict(&errors) {
            Some(slug) => NotesError::SlugTaken(slug),
            None => NotesError::Invalid(describe(&errors)),
        },
    }
}

fn slug_conflict(errors: &FormErrors) -> Option<String> {
    errors
        .field("slug")
        .iter()
        .find_map(|m| m.strip_suffix(crate::forms::WARNING))
        .map(str::to_string)
}

fn describe(errors: &FormErrors) -> String {
    let mut parts: Vec<String> = errors.non_field().to_vec();
    for field in ["username", "password1", "password2", "title", "text", "slug"] {
        for message in errors.field(field) {
            parts.push(format!("{}: {}", field, message));
        }
    }
    parts.join("; ")
}
