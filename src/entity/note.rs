// src/entity/note.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NoteId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Validated note fields, ready to be written by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub slug: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, text: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: slug.into(),
        }
    }
}

impl Note {
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }
}
