//! Persistence for the signed-in session's tokens.

use chrono::Utc;
use humor_core::error::Result;
use humor_core::session::Session;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::atomic_file::{AtomicFile, FileFormat};

/// A signed-in session as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) after which the access token is invalid.
    pub expires_at: i64,
    pub user: Session,
}

impl StoredSession {
    /// Returns true when the access token expires within `margin_secs`.
    pub fn expires_within(&self, margin_secs: i64) -> bool {
        self.expires_at - margin_secs <= Utc::now().timestamp()
    }
}

/// Reads and writes `session.json`.
///
/// Responsibilities:
/// - Keep the file private to the user (0600 on Unix)
/// - Treat a missing or empty file as "signed out"
pub struct TokenStorage {
    file: AtomicFile<StoredSession>,
}

impl TokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path, FileFormat::Json).private(),
        }
    }

    pub fn load(&self) -> Result<Option<StoredSession>> {
        self.file.load()
    }

    pub fn save(&self, session: &StoredSession) -> Result<()> {
        self.file.save(session)
    }

    pub fn clear(&self) -> Result<()> {
        self.file.remove()
    }
}
