//! Form decoding and validation for the HTML front end.

mod account;
mod note;

pub use account::{LoginForm, SignupForm};
pub use note::{NoteForm, WARNING};

use std::collections::BTreeMap;

use crate::error::NotesError;

pub const REQUIRED: &str = "This field is required.";

/// Validation messages keyed by field name, plus form-wide messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    /// Messages attached to `field`, empty if it validated
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

/// Why a submitted form did not produce a record.
#[derive(Debug)]
pub enum FormError {
    /// User-correctable input problems; re-render the form.
    Invalid(FormErrors),
    /// Anything else; surfaces as a server error.
    Failed(NotesError),
}

impl From<NotesError> for FormError {
    fn from(e: NotesError) -> Self {
        FormError::Failed(e)
    }
}

impl From<FormErrors> for FormError {
    fn from(errors: FormErrors) -> Self {
        FormError::Invalid(errors)
    }
}

pub(crate) fn max_length_message(max: usize) -> String {
    format!("Ensure this value has at most {} characters.", max)
}
