//! Durable login sessions, one JSON file per named session.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScrapeError};

/// A single cookie captured from a logged-in page, in the shape we replay
/// back into fresh contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

/// Filesystem-backed store of named sessions.
///
/// Sessions are looked up and written whole; there is no partial update.
/// Concurrent writers to the same name are not coordinated here - callers
/// that share a store must serialize their own saves.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn session_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.session_path(name).exists()
    }

    /// Load a saved session. `Ok(None)` when the session was never saved;
    /// an error only when a file exists but cannot be read or parsed.
    pub fn load(&self, name: &str) -> Result<Option<Vec<SessionCookie>>> {
        let path = self.session_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path).map_err(|err| ScrapeError::SessionLoad {
            name: name.to_string(),
            reason: err.to_string(),
        })?;
        let cookies: Vec<SessionCookie> =
            serde_json::from_str(&raw).map_err(|err| ScrapeError::SessionLoad {
                name: name.to_string(),
                reason: format!("invalid session file: {err}"),
            })?;

        debug!("loaded session '{name}' ({} cookies)", cookies.len());
        Ok(Some(cookies))
    }

    /// Persist a session, replacing any previous state under that name.
    pub fn save(&self, name: &str, cookies: &[SessionCookie]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.session_path(name);
        let json = serde_json::to_string_pretty(cookies).map_err(|err| {
            ScrapeError::SessionLoad {
                name: name.to_string(),
                reason: format!("could not serialize session: {err}"),
            }
        })?;
        fs::write(&path, json)?;
        debug!("saved session '{name}' ({} cookies)", cookies.len());
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str) -> SessionCookie {
        SessionCookie {
            name: name.to_string(),
            value: "abc123".to_string(),
            domain: ".example.com".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: false,
        }
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        let saved = store.save("twitter", &[cookie("auth_token"), cookie("ct0")]).unwrap();
        assert!(saved.ends_with("twitter.json"));
        assert!(store.exists("twitter"));

        let loaded = store.load("twitter").unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "auth_token");
        assert_eq!(loaded[0].domain, ".example.com");
    }

    #[test]
    fn missing_session_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        assert!(!store.exists("google"));
        assert!(store.load("google").unwrap().is_none());
    }

    #[test]
    fn corrupt_session_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let store = SessionStore::new(dir.path());

        let err = store.load("bad").unwrap_err();
        assert!(err.to_string().contains("bad"));
    }
}
