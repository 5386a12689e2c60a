// src/forms/note.rs
use serde::Deserialize;

use super::{max_length_message, FormError, FormErrors, REQUIRED};
use crate::entity::{Note, NoteDraft, NoteId, UserId};
use crate::error::NotesError;
use crate::slug::{is_valid_slug, slugify, SLUG_MAX_LENGTH};
use crate::storage::SqliteStore;

/// Appended to a slug that is already taken to form the field error.
pub const WARNING: &str = " - this slug already exists, please choose a unique value!";

pub const TITLE_MAX_LENGTH: usize = 100;

const INVALID_SLUG: &str =
    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.";

/// Create/edit form for a note. A blank slug is derived from the title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

impl NoteForm {
    pub fn new(title: impl Into<String>, text: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: slug.into(),
        }
    }

    /// Prefill the edit form from a stored note
    pub fn from_note(note: &Note) -> Self {
        Self::new(&note.title, &note.text, &note.slug)
    }

    /// Field-level checks that need no database access
    pub fn clean(&self) -> Result<NoteDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", REQUIRED);
        } else if title.chars().count() > TITLE_MAX_LENGTH {
            errors.add("title", max_length_message(TITLE_MAX_LENGTH));
        }

        if self.text.trim().is_empty() {
            errors.add("text", REQUIRED);
        }

        let slug = match self.slug.trim() {
            "" => slugify(title),
            explicit => {
                if explicit.chars().count() > SLUG_MAX_LENGTH {
                    errors.add("slug", max_length_message(SLUG_MAX_LENGTH));
                } else if !is_valid_slug(explicit) {
                    errors.add("slug", INVALID_SLUG);
                }
                explicit.to_string()
            }
        };
        if slug.is_empty() && errors.field("title").is_empty() && errors.field("slug").is_empty() {
            errors.add("slug", REQUIRED);
        }

        if errors.is_empty() {
            Ok(NoteDraft::new(title, self.text.clone(), slug))
        } else {
            Err(errors)
        }
    }

    /// Validate and insert a new note for `author_id`
    pub fn save_new(&self, store: &SqliteStore, author_id: UserId) -> Result<Note, FormError> {
        let draft = self.clean_unique(store, None)?;
        store
            .add_note(author_id, &draft)
            .map_err(|e| slug_error(e, &draft.slug))
    }

    /// Validate and apply an edit to `note`
    pub fn save_edit(&self, store: &SqliteStore, note: &Note) -> Result<Note, FormError> {
        let draft = self.clean_unique(store, Some(note.id))?;
        store
            .update_note(note.id, &draft)
            .map_err(|e| slug_error(e, &draft.slug))
    }

    fn clean_unique(&self, store: &SqliteStore, editing: Option<NoteId>) -> Result<NoteDraft, FormError> {
        let draft = self.clean()?;
        if store.slug_exists(&draft.slug, editing)? {
            return Err(FormErrors::single("slug", slug_taken_message(&draft.slug)).into());
        }
        Ok(draft)
    }
}

fn slug_taken_message(slug: &str) -> String {
    format!("{}{}", slug, WARNING)
}

fn slug_error(e: NotesError, slug: &str) -> FormError {
    match e {
        NotesError::SlugTaken(_) => FormErrors::single("slug", slug_taken_message(slug)).into(),
        other => FormError::Failed(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_author() -> (SqliteStore, UserId) {
        let store = SqliteStore::open_in_memory().unwrap();
        let author = store.create_user("author", "hash").unwrap();
        (store, author.id)
    }

    fn invalid(result: Result<Note, FormError>) -> FormErrors {
        match result {
            Err(FormError::Invalid(errors)) => errors,
            other => panic!("expected form errors, got {:?}", other),
        }
    }

    #[test]
    fn test_clean_valid_form() {
        let draft = NoteForm::new("Title", "Text", "note-slug").clean().unwrap();
        assert_eq!(draft, NoteDraft::new("Title", "Text", "note-slug"));
    }

    #[test]
    fn test_clean_required_fields() {
        let errors = NoteForm::default().clean().unwrap_err();
        assert_eq!(errors.field("title"), [REQUIRED]);
        assert_eq!(errors.field("text"), [REQUIRED]);
        assert!(errors.field("slug").is_empty());
    }

    #[test]
    fn test_clean_derives_slug_from_title() {
        let draft = NoteForm::new("Новый заголовок", "Text", "").clean().unwrap();
        assert_eq!(draft.slug, "novyj-zagolovok");
    }

    #[test]
    fn test_clean_rejects_underivable_slug() {
        let errors = NoteForm::new("???", "Text", "").clean().unwrap_err();
        assert_eq!(errors.field("slug"), [REQUIRED]);
    }

    #[test]
    fn test_clean_length_limits() {
        let long = "x".repeat(101);
        let errors = NoteForm::new(long.clone(), "Text", long).clean().unwrap_err();
        assert_eq!(errors.field("title"), [max_length_message(100)]);
        assert_eq!(errors.field("slug"), [max_length_message(100)]);
    }

    #[test]
    fn test_clean_rejects_bad_slug_characters() {
        let errors = NoteForm::new("Title", "Text", "no spaces").clean().unwrap_err();
        assert_eq!(errors.field("slug"), [INVALID_SLUG]);
    }

    #[test]
    fn test_save_new_duplicate_slug() {
        let (store, author) = store_with_author();
        let form = NoteForm::new("Title", "Text", "Slug");
        form.save_new(&store, author).unwrap();

        let errors = invalid(form.save_new(&store, author));
        assert_eq!(errors.field("slug"), [format!("Slug{}", WARNING)]);
        assert_eq!(store.count_notes().unwrap(), 1);
    }

    #[test]
    fn test_save_new_duplicate_derived_slug() {
        let (store, author) = store_with_author();
        NoteForm::new("Same title", "Text", "").save_new(&store, author).unwrap();

        let errors = invalid(NoteForm::new("Same title", "Other", "").save_new(&store, author));
        assert_eq!(errors.field("slug"), [format!("same-title{}", WARNING)]);
    }

    #[test]
    fn test_save_edit_allows_own_slug() {
        let (store, author) = store_with_author();
        let note = NoteForm::new("Title", "Text", "mine").save_new(&store, author).unwrap();

        let updated = NoteForm::new("Title", "Changed", "mine")
            .save_edit(&store, &note)
            .unwrap();
        assert_eq!(updated.text, "Changed");
        assert_eq!(updated.id, note.id);
    }

    #[test]
    fn test_save_edit_rejects_other_slug() {
        let (store, author) = store_with_author();
        let note = NoteForm::new("One", "Text", "one").save_new(&store, author).unwrap();
        NoteForm::new("Two", "Text", "two").save_new(&store, author).unwrap();

        let errors = invalid(NoteForm::new("One", "Changed", "two").save_edit(&store, &note));
        assert_eq!(errors.field("slug"), [format!("two{}", WARNING)]);
        assert_eq!(store.get_note(note.id).unwrap().unwrap().text, "Text");
    }

    #[test]
    fn test_from_note_prefills() {
        let (store, author) = store_with_author();
        let note = NoteForm::new("Title", "Text", "slug").save_new(&store, author).unwrap();
        assert_eq!(NoteForm::from_note(&note), NoteForm::new("Title", "Text", "slug"));
    }
}
