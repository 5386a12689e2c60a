//! `tower-sessions` backend on top of [`SqliteStore`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower_sessions::session::{Id, Record};
use tower_sessions::{session_store, SessionStore};

use crate::entity::Session;
use crate::error::NotesError;
use crate::storage::SqliteStore;

/// Session records live in the `sessions` table of the application database.
#[derive(Clone)]
pub struct SqliteSessionStore {
    store: Arc<Mutex<SqliteStore>>,
}

impl SqliteSessionStore {
    pub fn new(store: Arc<Mutex<SqliteStore>>) -> Self {
        Self { store }
    }
}

impl fmt::Debug for SqliteSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteSessionStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let store = self.store.lock().await;
        while !store.insert_session(&to_row(record)?).map_err(backend)? {
            record.id = Id::default();
        }
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let row = to_row(record)?;
        self.store.lock().await.save_session(&row).map_err(backend)
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let row = self
            .store
            .lock()
            .await
            .load_session(&id.to_string())
            .map_err(backend)?;
        row.map(|row| from_row(*id, row)).transpose()
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.store
            .lock()
            .await
            .delete_session(&id.to_string())
            .map_err(backend)?;
        Ok(())
    }
}

fn to_row(record: &Record) -> session_store::Result<Session> {
    let data = serde_json::to_string(&record.data)
        .map_err(|e| session_store::Error::Encode(e.to_string()))?;
    let expires_at = DateTime::<Utc>::from_timestamp(record.expiry_date.unix_timestamp(), 0)
        .ok_or_else(|| session_store::Error::Encode("session expiry out of range".to_string()))?;
    Ok(Session {
        id: record.id.to_string(),
        data,
        expires_at,
    })
}

fn from_row(id: Id, row: Session) -> session_store::Result<Record> {
    let data = serde_json::from_str(&row.data)
        .map_err(|e| session_store::Error::Decode(e.to_string()))?;
    let expiry_date = OffsetDateTime::from_unix_timestamp(row.expires_at.timestamp())
        .map_err(|e| session_store::Error::Decode(e.to_string()))?;
    Ok(Record {
        id,
        data,
        expiry_date,
    })
}

fn backend(e: NotesError) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}
