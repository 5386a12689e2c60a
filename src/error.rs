use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Slug already in use: {0}")]
    SlugTaken(String),

    #[error("Username already in use: {0}")]
    UsernameTaken(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Password hashing error: {0}")]
    Password(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NotesError>;
