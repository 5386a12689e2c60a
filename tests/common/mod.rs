//! In-process test client for the slugnote router.
#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Duration;
use time::OffsetDateTime;
use tower::ServiceExt;
use tower_sessions::session::{Id, Record};
use tower_sessions::SessionStore;

use slugnote::entity::{Note, NoteDraft, User};
use slugnote::web::{router, AppState, SqliteSessionStore, SESSION_COOKIE, USER_ID_KEY};
use slugnote::SqliteStore;

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = SqliteStore::open_in_memory().unwrap();
        let state = AppState::new(store, Duration::hours(24));
        let router = router(state.clone());
        Self { state, router }
    }

    /// Create an account that can only be used through `force_login`
    pub async fn create_user(&self, username: &str) -> User {
        self.state
            .store
            .lock()
            .await
            .create_user(username, "!unusable")
            .unwrap()
    }

    /// Open a session for `user` and return the matching `Cookie` header value
    pub async fn force_login(&self, user: &User) -> String {
        let mut record = Record {
            id: Id::default(),
            data: [(USER_ID_KEY.to_string(), serde_json::json!(user.id))]
                .into_iter()
                .collect(),
            expiry_date: OffsetDateTime::now_utc() + time::Duration::hours(1),
        };
        SqliteSessionStore::new(self.state.store.clone())
            .create(&mut record)
            .await
            .unwrap();
        format!("{}={}", SESSION_COOKIE, record.id)
    }

    pub async fn create_note(&self, author: &User, title: &str, text: &str, slug: &str) -> Note {
        self.state
            .store
            .lock()
            .await
            .add_note(author.id, &NoteDraft::new(title, text, slug))
            .unwrap()
    }

    pub async fn note_count(&self) -> usize {
        self.state.store.lock().await.count_notes().unwrap()
    }

    pub async fn refresh(&self, note: &Note) -> Note {
        self.state
            .store
            .lock()
            .await
            .get_note(note.id)
            .unwrap()
            .expect("note should still exist")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.send(Method::DELETE, uri, cookie, None).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Response {
        let form = encode_form(fields);
        self.send_body(Method::POST, uri, cookie, Some("application/x-www-form-urlencoded"), form)
            .await
    }

    /// POST an arbitrary body; `content_type` of `None` sends no header
    pub async fn post_raw(
        &self,
        uri: &str,
        cookie: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> Response {
        self.send_body(Method::POST, uri, cookie, content_type, body.to_string())
            .await
    }

    async fn send(&self, method: Method, uri: &str, cookie: Option<&str>, body: Option<String>) -> Response {
        self.send_body(method, uri, cookie, None, body.unwrap_or_default())
            .await
    }

    async fn send_body(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        content_type: Option<&str>,
        body: String,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let body = Body::from(body);
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn assert_redirects(response: &Response, expected: &str) {
    assert_eq!(response.status(), StatusCode::FOUND, "expected a redirect to {expected}");
    assert_eq!(response.headers()[LOCATION], expected);
}

pub fn login_url_for(next: &str) -> String {
    format!("/auth/login/?next={}", next)
}
