//! Author-only access policy for note-scoped actions.
//!
//! Every route that addresses a single note (detail, edit, delete) asks this
//! module before touching the note. The answer is binary: the author may do
//! everything, nobody else may do anything. A denial for a signed-in user is
//! reported as "not found" so that the response does not reveal that a note
//! with the slug exists.

use std::fmt;

use crate::entity::{Note, User};

/// Something a user attempts on a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewDetail,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::ViewDetail, Action::Edit, Action::Delete];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ViewDetail => write!(f, "view_detail"),
            Action::Edit => write!(f, "edit"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// Outcome of an authorization check, as the web layer must report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Anonymous request; send the visitor to the login page.
    LoginRequired,
    /// Signed-in non-owner, or no such note.
    NotFound,
}

/// Returns true iff `user` is signed in and wrote `note`.
///
/// The action does not change the answer; it is part of the signature so
/// that call sites say what they are about to do.
pub fn can_access(user: Option<&User>, note: &Note, _action: Action) -> bool {
    user.is_some_and(|u| note.is_authored_by(u.id))
}

/// Maps the policy onto its HTTP-facing outcome.
///
/// `note` is `None` when the slug did not resolve. Anonymous callers are sent
/// to login before the lookup result is considered, so a missing note and a
/// foreign note look the same to everybody.
pub fn authorize(user: Option<&User>, note: Option<&Note>, action: Action) -> Access {
    let Some(user) = user else {
        return Access::LoginRequired;
    };
    match note {
        Some(note) if can_access(Some(user), note, action) => Access::Granted,
        _ => Access::NotFound,
    }
}
