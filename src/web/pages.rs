//! Server-rendered HTML pages.

use std::fmt::Write;

use super::{
    delete_url, detail_url, edit_url, ADD_URL, HOME_URL, LIST_URL, LOGIN_URL, LOGOUT_URL,
    SIGNUP_URL,
};
use crate::entity::{Note, User};
use crate::forms::{FormErrors, NoteForm};

/// Escape text for HTML element content and quoted attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, user: Option<&User>, body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<a href="{HOME_URL}">Home</a> <a href="{LIST_URL}">My notes</a> <a href="{ADD_URL}">Add note</a> <span>{}</span> <form method="post" action="{LOGOUT_URL}" class="inline"><button type="submit">Log out</button></form>"#,
            escape(&user.username)
        ),
        None => format!(
            r#"<a href="{HOME_URL}">Home</a> <a href="{LOGIN_URL}">Log in</a> <a href="{SIGNUP_URL}">Sign up</a>"#
        ),
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} | slugnote</title></head>\n<body>\n<nav>{}</nav>\n<main>\n{}\n</main>\n</body>\n</html>\n",
        escape(title),
        nav,
        body
    )
}

fn error_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<ul class="errorlist">"#);
    for message in messages {
        let _ = write!(out, "<li>{}</li>", escape(message));
    }
    out.push_str("</ul>");
    out
}

fn input(label: &str, name: &str, kind: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        r#"<p>{}<label for="id_{name}">{label}</label> <input type="{kind}" name="{name}" id="id_{name}" value="{}"></p>"#,
        error_list(errors.field(name)),
        escape(value)
    )
}

pub fn home(user: Option<&User>) -> String {
    let body = match user {
        Some(_) => format!(
            r#"<h1>Notes</h1><p>Keep your notes in one place. <a href="{LIST_URL}">Open your notes</a>.</p>"#
        ),
        None => format!(
            r#"<h1>Notes</h1><p>Keep your notes in one place. <a href="{LOGIN_URL}">Log in</a> or <a href="{SIGNUP_URL}">sign up</a> to start.</p>"#
        ),
    };
    layout("Home", user, &body)
}

pub fn login(username: &str, next: Option<&str>, errors: &FormErrors) -> String {
    let next_field = next
        .map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(n)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Log in</h1><form method="post" action="{LOGIN_URL}">{}{}{}{}<button type="submit">Log in</button></form>"#,
        error_list(errors.non_field()),
        input("Username", "username", "text", username, errors),
        input("Password", "password", "password", "", errors),
        next_field
    );
    layout("Log in", None, &body)
}

pub fn logged_out() -> String {
    let body = format!(
        r#"<h1>Logged out</h1><p>You have been logged out. <a href="{LOGIN_URL}">Log in again</a>.</p>"#
    );
    layout("Logged out", None, &body)
}

pub fn signup(username: &str, errors: &FormErrors) -> String {
    let body = format!(
        r#"<h1>Sign up</h1><form method="post" action="{SIGNUP_URL}">{}{}{}{}<button type="submit">Sign up</button></form>"#,
        error_list(errors.non_field()),
        input("Username", "username", "text", username, errors),
        input("Password", "password1", "password", "", errors),
        input("Password confirmation", "password2", "password", "", errors),
    );
    layout("Sign up", None, &body)
}

pub fn note_list(user: &User, notes: &[Note]) -> String {
    let mut body = String::from("<h1>My notes</h1>");
    if notes.is_empty() {
        let _ = write!(body, r#"<p>No notes yet. <a href="{ADD_URL}">Add one</a>.</p>"#);
    } else {
        body.push_str(r#"<ol class="notes">"#);
        for note in notes {
            let _ = write!(
                body,
                r#"<li data-id="{}"><a href="{}">{}</a></li>"#,
                note.id,
                escape(&detail_url(&note.slug)),
                escape(&note.title)
            );
        }
        body.push_str("</ol>");
    }
    layout("My notes", Some(user), &body)
}

/// Add/edit form; `action` is the URL the form posts back to
pub fn note_form(user: &User, heading: &str, action: &str, form: &NoteForm, errors: &FormErrors) -> String {
    let body = format!(
        r#"<h1>{}</h1><form method="post" action="{}">{}{}<p>{}<label for="id_text">Text</label> <textarea name="text" id="id_text">{}</textarea></p>{}<button type="submit">Save</button></form>"#,
        escape(heading),
        escape(action),
        error_list(errors.non_field()),
        input("Title", "title", "text", &form.title, errors),
        error_list(errors.field("text")),
        escape(&form.text),
        input("Slug", "slug", "text", &form.slug, errors),
    );
    layout(heading, Some(user), &body)
}

pub fn success(user: &User) -> String {
    let body = format!(
        r#"<h1>Done</h1><p>Your changes were saved. <a href="{LIST_URL}">Back to your notes</a>.</p>"#
    );
    layout("Done", Some(user), &body)
}

pub fn note_detail(user: &User, note: &Note) -> String {
    let body = format!(
        r#"<article><h1>{}</h1><p class="slug">{}</p><div class="text">{}</div></article><p><a href="{}">Edit</a> <a href="{}">Delete</a></p>"#,
        escape(&note.title),
        escape(&note.slug),
        escape(&note.text),
        escape(&edit_url(&note.slug)),
        escape(&delete_url(&note.slug)),
    );
    layout(&note.title, Some(user), &body)
}

pub fn delete_confirm(user: &User, note: &Note) -> String {
    let body = format!(
        r#"<h1>Delete note</h1><p>Delete “{}”? This cannot be undone.</p><form method="post" action="{}"><button type="submit">Delete</button></form>"#,
        escape(&note.title),
        escape(&delete_url(&note.slug)),
    );
    layout("Delete note", Some(user), &body)
}

pub fn not_found() -> String {
    layout("Not found", None, "<h1>Not found</h1><p>The requested page does not exist.</p>")
}

pub fn server_error() -> String {
    layout("Server error", None, "<h1>Server error</h1><p>Something went wrong.</p>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: 1,
            username: "<admin>".to_string(),
            password_hash: String::new(),
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_layout_escapes_username() {
        let html = success(&user());
        assert!(html.contains("&lt;admin&gt;"));
        assert!(!html.contains("<admin>"));
    }

    #[test]
    fn test_note_form_shows_errors_and_values() {
        let form = NoteForm::new("T", "<script>", "dup");
        let errors = FormErrors::single("slug", "dup is taken");
        let html = note_form(&user(), "Edit note", "/edit/dup/", &form, &errors);
        assert!(html.contains("<form"));
        assert!(html.contains(r#"<ul class="errorlist"><li>dup is taken</li></ul>"#));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"value="dup""#));
    }
}
