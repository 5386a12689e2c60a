pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod forms;
pub mod password;
pub mod policy;
pub mod slug;
pub mod storage;
pub mod web;

pub use config::ServerConfig;
pub use error::{NotesError, Result};
pub use storage::SqliteStore;
