// src/entity/session.rs
use chrono::{DateTime, Utc};

/// Persisted login session: the id carried by the `sessionid` cookie, the
/// JSON-encoded session data and the moment it lapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub data: String,
    pub expires_at: DateTime<Utc>,
}
