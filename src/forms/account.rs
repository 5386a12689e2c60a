// src/forms/account.rs
use serde::Deserialize;

use super::{max_length_message, FormError, FormErrors, REQUIRED};
use crate::entity::User;
use crate::error::NotesError;
use crate::password::{hash_password, verify_password};
use crate::storage::SqliteStore;

pub const USERNAME_MAX_LENGTH: usize = 150;

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, \
                                numbers, and @/./+/-/_ characters.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
const INVALID_LOGIN: &str = "Please enter a correct username and password. \
                             Note that both fields may be case-sensitive.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl SignupForm {
    /// Validate and create the account
    pub fn save(&self, store: &SqliteStore) -> Result<User, FormError> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();

        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username.chars().count() > USERNAME_MAX_LENGTH {
            errors.add("username", max_length_message(USERNAME_MAX_LENGTH));
        } else if !username.chars().all(is_username_char) {
            errors.add("username", INVALID_USERNAME);
        } else if store.username_exists(username)? {
            errors.add("username", USERNAME_TAKEN);
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if !self.password1.is_empty() && self.password1 != self.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        let hash = hash_password(&self.password1)?;
        store.create_user(username, &hash).map_err(|e| match e {
            NotesError::UsernameTaken(_) => {
                FormErrors::single("username", USERNAME_TAKEN).into()
            }
            other => FormError::Failed(other),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Required-field checks; returns the username to look up
    pub fn clean(&self) -> Result<&str, FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        if errors.is_empty() {
            Ok(username)
        } else {
            Err(errors)
        }
    }

    /// Check the password against `user`, the account found for the username.
    ///
    /// Runs the Argon2 verification, so call it off the async runtime.
    pub fn verify(&self, user: Option<User>) -> Result<User, FormError> {
        match user {
            Some(user) if verify_password(&self.password, &user.password_hash)? => Ok(user),
            _ => {
                let mut errors = FormErrors::new();
                errors.add_non_field(INVALID_LOGIN);
                Err(errors.into())
            }
        }
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, p1: &str, p2: &str) -> SignupForm {
        SignupForm {
            username: username.to_string(),
            password1: p1.to_string(),
            password2: p2.to_string(),
        }
    }

    fn authenticate(form: &LoginForm, store: &SqliteStore) -> Result<User, FormError> {
        let username = form.clean()?;
        let user = store.get_user_by_username(username)?;
        form.verify(user)
    }

    fn errors_of<T: std::fmt::Debug>(result: Result<T, FormError>) -> FormErrors {
        match result {
            Err(FormError::Invalid(errors)) => errors,
            other => panic!("expected form errors, got {:?}", other),
        }
    }

    #[test]
    fn test_signup_then_login() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = signup("Читатель", "s3cret!", "s3cret!").save(&store).unwrap();
        assert_eq!(user.username, "Читатель");
        assert_ne!(user.password_hash, "s3cret!");

        let login = LoginForm {
            username: "Читатель".to_string(),
            password: "s3cret!".to_string(),
            next: None,
        };
        assert_eq!(authenticate(&login, &store).unwrap().id, user.id);
    }

    #[test]
    fn test_signup_validation() {
        let store = SqliteStore::open_in_memory().unwrap();
        signup("taken", "pw", "pw").save(&store).unwrap();

        let errors = errors_of(signup("taken", "a", "b").save(&store));
        assert_eq!(errors.field("username"), [USERNAME_TAKEN]);
        assert_eq!(errors.field("password2"), [PASSWORD_MISMATCH]);

        let errors = errors_of(signup("", "", "").save(&store));
        assert_eq!(errors.field("username"), [REQUIRED]);
        assert_eq!(errors.field("password1"), [REQUIRED]);
        assert_eq!(errors.field("password2"), [REQUIRED]);

        let errors = errors_of(signup("bad name", "pw", "pw").save(&store));
        assert_eq!(errors.field("username"), [INVALID_USERNAME]);
    }

    #[test]
    fn test_login_wrong_password() {
        let store = SqliteStore::open_in_memory().unwrap();
        signup("author", "right", "right").save(&store).unwrap();

        let login = LoginForm {
            username: "author".to_string(),
            password: "wrong".to_string(),
            next: None,
        };
        let errors = errors_of(authenticate(&login, &store));
        assert_eq!(errors.non_field(), [INVALID_LOGIN]);

        let unknown = LoginForm {
            username: "nobody".to_string(),
            password: "right".to_string(),
            next: None,
        };
        let errors = errors_of(authenticate(&unknown, &store));
        assert_eq!(errors.non_field(), [INVALID_LOGIN]);
    }

    #[test]
    fn test_login_required_fields() {
        let login = LoginForm::default();
        let errors = login.clean().unwrap_err();
        assert_eq!(errors.field("username"), [REQUIRED]);
        assert_eq!(errors.field("password"), [REQUIRED]);
    }
}
