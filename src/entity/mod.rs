mod note;
mod session;
mod user;

pub use note::{Note, NoteDraft};
pub use session::Session;
pub use user::User;

/// Store-assigned row identifier
pub type NoteId = i64;
pub type UserId = i64;
