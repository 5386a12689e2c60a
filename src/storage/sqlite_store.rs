use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::entity::{Note, NoteDraft, NoteId, Session, User, UserId};
use crate::error::{NotesError, Result};

const NOTE_COLUMNS: &str = "id, title, text, slug, author_id, created_at";
const USER_COLUMNS: &str = "id, username, password_hash, date_joined";

/// SQLite-backed store for users, notes and login sessions
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the database file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        Ok(store)
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                date_joined TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_notes_author ON notes(author_id);

            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    // --- Users ---

    /// Create a user account. `password_hash` must already be hashed.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let date_joined = Utc::now().trunc_subsecs(6);
        self.conn
            .execute(
                "INSERT INTO users (username, password_hash, date_joined) VALUES (?1, ?2, ?3)",
                params![username, password_hash, timestamp(&date_joined)],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    NotesError::UsernameTaken(username.to_string())
                } else {
                    e.into()
                }
            })?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            date_joined,
        })
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                [username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            [username],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    // --- Notes ---

    /// Check whether `slug` is used by any note other than `exclude`
    pub fn slug_exists(&self, slug: &str, exclude: Option<NoteId>) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM notes WHERE slug = ?1 AND id IS NOT ?2)",
            params![slug, exclude],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Insert a note owned by `author_id`.
    ///
    /// Fails with [`NotesError::SlugTaken`] when another note already uses the slug.
    pub fn add_note(&self, author_id: UserId, draft: &NoteDraft) -> Result<Note> {
        if self.slug_exists(&draft.slug, None)? {
            return Err(NotesError::SlugTaken(draft.slug.clone()));
        }

        let created_at = Utc::now().trunc_subsecs(6);
        self.conn
            .execute(
                "INSERT INTO notes (title, text, slug, author_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    draft.title,
                    draft.text,
                    draft.slug,
                    author_id,
                    timestamp(&created_at),
                ],
            )
            .map_err(|e| slug_conflict(e, &draft.slug))?;

        Ok(Note {
            id: self.conn.last_insert_rowid(),
            title: draft.title.clone(),
            text: draft.text.clone(),
            slug: draft.slug.clone(),
            author_id,
            created_at,
        })
    }

    pub fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
                [id],
                note_from_row,
            )
            .optional()?;
        Ok(note)
    }

    pub fn get_note_by_slug(&self, slug: &str) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE slug = ?1"),
                [slug],
                note_from_row,
            )
            .optional()?;
        Ok(note)
    }

    /// All notes in creation order
    pub fn list_notes(&self) -> Result<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY id ASC"))?;
        let notes = stmt
            .query_map([], note_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// Notes written by `author_id`, in creation order
    pub fn list_notes_by_author(&self, author_id: UserId) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE author_id = ?1 ORDER BY id ASC"
        ))?;
        let notes = stmt
            .query_map([author_id], note_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// Replace title, text and slug of an existing note. The author never changes.
    pub fn update_note(&self, id: NoteId, draft: &NoteDraft) -> Result<Note> {
        if self.slug_exists(&draft.slug, Some(id))? {
            return Err(NotesError::SlugTaken(draft.slug.clone()));
        }

        let changed = self
            .conn
            .execute(
                "UPDATE notes SET title = ?1, text = ?2, slug = ?3 WHERE id = ?4",
                params![draft.title, draft.text, draft.slug, id],
            )
            .map_err(|e| slug_conflict(e, &draft.slug))?;

        if changed == 0 {
            return Err(NotesError::NoteNotFound(id.to_string()));
        }

        self.get_note(id)?
            .ok_or_else(|| NotesError::NoteNotFound(id.to_string()))
    }

    pub fn delete_note(&self, id: NoteId) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(NotesError::NoteNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn count_notes(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // --- Sessions ---

    /// Insert a new session; `false` if the id is already taken
    pub fn insert_session(&self, session: &Session) -> Result<bool> {
        let rows = self.conn.execute(
            "INSERT INTO sessions (id, data, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO NOTHING",
            params![session.id, session.data, timestamp(&session.expires_at)],
        )?;
        Ok(rows == 1)
    }

    /// Insert or overwrite a session
    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (id, data, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data, expires_at = excluded.expires_at",
            params![session.id, session.data, timestamp(&session.expires_at)],
        )?;
        Ok(())
    }

    /// Look up a session that has not expired yet
    pub fn load_session(&self, id: &str) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                "SELECT id, data, expires_at FROM sessions WHERE id = ?1 AND expires_at > ?2",
                params![id, timestamp(&Utc::now())],
                |row| {
                    Ok(Session {
                        id: row.get(0)?,
                        data: row.get(1)?,
                        expires_at: parse_timestamp(row, 2)?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    /// Delete a session (logout)
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired_sessions(&self) -> Result<usize> {
        let rows = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            [timestamp(&Utc::now())],
        )?;
        Ok(rows)
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        slug: row.get(3)?,
        author_id: row.get(4)?,
        created_at: parse_timestamp(row, 5)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        date_joined: parse_timestamp(row, 3)?,
    })
}

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn slug_conflict(e: rusqlite::Error, slug: &str) -> NotesError {
    if is_unique_violation(&e) {
        NotesError::SlugTaken(slug.to_string())
    } else {
        e.into()
    }
}

impl From<rusqlite::Error> for NotesError {
    fn from(e: rusqlite::Error) -> Self {
        NotesError::Storage(format!("SQLite error: {}", e))
    }
}
