use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{NotesError, Result};

/// Runtime configuration for the web server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind: SocketAddr,
    /// SQLite database file
    pub database: PathBuf,
    /// Login session lifetime, refreshed on every authenticated request
    pub session_ttl_hours: i64,
}

/// Upper bound on `session_ttl_hours`: ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366 * 10;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database: PathBuf::from("slugnote.db"),
            session_ttl_hours: 24,
        }
    }
}

impl ServerConfig {
    /// Read a TOML file; keys it omits keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        self.session_ttl().map(|_| ())
    }

    /// Session lifetime; between one hour and [`MAX_SESSION_TTL_HOURS`]
    pub fn session_ttl(&self) -> Result<Duration> {
        Some(self.session_ttl_hours)
            .filter(|hours| (1..=MAX_SESSION_TTL_HOURS).contains(hours))
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                NotesError::Invalid(format!(
                    "session_ttl_hours must be between 1 and {}, got {}",
                    MAX_SESSION_TTL_HOURS, self.session_ttl_hours
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind.to_string(), "127.0.0.1:8000");
        assert_eq!(config.database, PathBuf::from("slugnote.db"));
        assert_eq!(config.session_ttl().unwrap(), Duration::hours(24));
    }

    #[test]
    fn test_load_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slugnote.toml");
        fs::write(&path, "bind = \"0.0.0.0:9000\"\nsession_ttl_hours = 2\n").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.session_ttl_hours, 2);
        assert_eq!(config.database, PathBuf::from("slugnote.db"));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slugnote.toml");
        fs::write(&path, "bind = 12").unwrap();

        assert!(matches!(
            ServerConfig::load(&path),
            Err(NotesError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(ServerConfig::load(&tmp.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_session_ttl_out_of_range() {
        for hours in [0, -1, MAX_SESSION_TTL_HOURS + 1, i64::MAX] {
            let config = ServerConfig {
                session_ttl_hours: hours,
                ..ServerConfig::default()
            };
            assert!(matches!(config.session_ttl(), Err(NotesError::Invalid(_))));
        }
    }

    #[test]
    fn test_load_rejects_huge_session_ttl() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slugnote.toml");
        fs::write(&path, "session_ttl_hours = 9223372036854775807\n").unwrap();

        let err = ServerConfig::load(&path).unwrap_err();
        assert!(matches!(err, NotesError::Invalid(_)));
        assert!(err.to_string().contains("session_ttl_hours"));
    }
}
