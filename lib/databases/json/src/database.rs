//  DATABASE.rs
//    by Lut99
//
//  Created:
//    13 Mar 2025, 09:16:03
//  Last edited:
//    03 Apr 2025, 14:51:26
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the actual [`Database`].
//

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use specifications::model::Ledger;
use specifications::Database;
use thiserror::Error;
use tracing::{debug, warn};


/***** CONSTANTS *****/
/// The name of the file holding the ledger snapshot.
pub const FINES_FILE_NAME: &str = "fines.json";

/// The name of the file holding the persisted session.
pub const SESSION_FILE_NAME: &str = "session.json";





/***** ERRORS *****/
/// Defines errors originating from the [`JsonDatabase`].
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to create the database directory.
    #[error("Failed to create database directory {:?}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        err:  std::io::Error,
    },
    /// Failed to read one of the database files.
    #[error("Failed to read database file {:?}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        err:  std::io::Error,
    },
    /// Failed to remove one of the database files.
    #[error("Failed to remove database file {:?}", path.display())]
    RemoveFile {
        path: PathBuf,
        #[source]
        err:  std::io::Error,
    },
    /// Failed to serialize the ledger snapshot as JSON.
    #[error("Failed to serialize the ledger as JSON")]
    SerializeLedger {
        #[source]
        err: serde_json::Error,
    },
    /// Failed to serialize the session as JSON.
    #[error("Failed to serialize the session as JSON")]
    SerializeSession {
        #[source]
        err: serde_json::Error,
    },
    /// Failed to write one of the database files.
    #[error("Failed to write database file {:?}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        err:  std::io::Error,
    },
}





/***** HELPERS *****/
/// The on-disk shape of the persisted session.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct Session {
    /// The username persisted at the last successful login.
    username: String,
}





/***** LIBRARY *****/
/// A [`Database`] that keeps the board's state in a directory of JSON files.
///
/// The ledger lives in [`FINES_FILE_NAME`] as a plain JSON array of entries in the wire format of
/// the model crate, the session in [`SESSION_FILE_NAME`]. A snapshot that is missing or fails to
/// parse degrades to an empty one with a warning; it never takes the board down.
#[derive(Clone, Debug)]
pub struct JsonDatabase {
    /// The directory holding the database files.
    root: PathBuf,
}
impl JsonDatabase {
    /// Constructor for the JsonDatabase.
    ///
    /// # Arguments
    /// - `root`: The directory to keep the database files in. Created on the first write if it
    ///   does not exist yet.
    ///
    /// # Returns
    /// A new JsonDatabase ready to load and save snapshots.
    #[inline]
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    /// Returns the path of the ledger snapshot file.
    #[inline]
    pub fn fines_path(&self) -> PathBuf { self.root.join(FINES_FILE_NAME) }

    /// Returns the path of the session file.
    #[inline]
    pub fn session_path(&self) -> PathBuf { self.root.join(SESSION_FILE_NAME) }

    /// Helper function for reading a file that may legitimately not exist.
    ///
    /// # Arguments
    /// - `path`: The path of the file to read.
    ///
    /// # Returns
    /// The file's contents, or [`None`] if there was no file.
    ///
    /// # Errors
    /// This function errors on any I/O failure other than the file not existing.
    async fn read_opt(path: &Path) -> Result<Option<String>, DatabaseError> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(DatabaseError::ReadFile { path: path.into(), err }),
        }
    }

    /// Helper function for writing a file, creating the database directory as needed.
    ///
    /// # Arguments
    /// - `path`: The path of the file to write.
    /// - `contents`: What to write to it.
    ///
    /// # Errors
    /// This function errors if the directory or the file could not be written.
    async fn write(&self, path: &Path, contents: String) -> Result<(), DatabaseError> {
        if let Err(err) = tokio::fs::create_dir_all(&self.root).await {
            return Err(DatabaseError::CreateDir { path: self.root.clone(), err });
        }
        match tokio::fs::write(path, contents).await {
            Ok(_) => Ok(()),
            Err(err) => Err(DatabaseError::WriteFile { path: path.into(), err }),
        }
    }
}
impl Database for JsonDatabase {
    type Error = DatabaseError;


    // Ledger
    async fn load_ledger(&self) -> Result<Ledger, Self::Error> {
        let path: PathBuf = self.fines_path();

        debug!("Loading ledger snapshot from {:?}...", path.display());
        let raw: String = match Self::read_opt(&path).await? {
            Some(raw) => raw,
            None => {
                debug!("No ledger snapshot at {:?}; starting empty", path.display());
                return Ok(Ledger::default());
            },
        };
        match serde_json::from_str(&raw) {
            Ok(ledger) => Ok(ledger),
            Err(err) => {
                // The ledger is recomputable state, so a broken snapshot degrades instead of erroring
                warn!("Ledger snapshot {:?} is corrupt ({err}); starting empty", path.display());
                Ok(Ledger::default())
            },
        }
    }

    async fn save_ledger(&self, ledger: &Ledger) -> Result<(), Self::Error> {
        let path: PathBuf = self.fines_path();

        debug!("Saving ledger snapshot ({} entries) to {:?}...", ledger.entries.len(), path.display());
        let raw: String = match serde_json::to_string_pretty(ledger) {
            Ok(raw) => raw,
            Err(err) => return Err(DatabaseError::SerializeLedger { err }),
        };
        self.write(&path, raw).await
    }


    // Session
    async fn load_session(&self) -> Result<Option<String>, Self::Error> {
        let path: PathBuf = self.session_path();

        debug!("Loading session from {:?}...", path.display());
        let raw: String = match Self::read_opt(&path).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session.username)),
            Err(err) => {
                warn!("Session file {:?} is corrupt ({err}); treating as signed out", path.display());
                Ok(None)
            },
        }
    }

    async fn save_session(&self, username: &str) -> Result<(), Self::Error> {
        let path: PathBuf = self.session_path();

        debug!("Persisting session for {username:?} to {:?}...", path.display());
        let raw: String = match serde_json::to_string_pretty(&Session { username: username.into() }) {
            Ok(raw) => raw,
            Err(err) => return Err(DatabaseError::SerializeSession { err }),
        };
        self.write(&path, raw).await
    }

    async fn clear_session(&self) -> Result<(), Self::Error> {
        let path: PathBuf = self.session_path();

        debug!("Clearing session at {:?}...", path.display());
        match tokio::fs::remove_file(&path).await {
            Ok(_) => Ok(()),
            // Nobody was signed in; that's a fine state to clear to
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(DatabaseError::RemoveFile { path, err }),
        }
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use specifications::model::{EntryKind, LedgerEntry, Reply};

    use super::*;

    fn database() -> (tempfile::TempDir, JsonDatabase) {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonDatabase::new(dir.path());
        (dir, db)
    }

    fn entry() -> LedgerEntry {
        LedgerEntry {
            id: 1741700000000,
            date: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
            offender: "Toby".into(),
            description: "late".into(),
            kind: EntryKind::Fine,
            magnitude: 10.0,
            proposer: "alex".into(),
            edited: None,
            replies: vec![],
        }
    }

    #[tokio::test]
    async fn missing_snapshot_degrades_to_empty_ledger() {
        let (_dir, db) = database();
        assert_eq!(db.load_ledger().await.unwrap(), Ledger::default());
    }

    #[tokio::test]
    async fn corrupt_snapshot_degrades_to_empty_ledger() {
        let (_dir, db) = database();
        tokio::fs::write(db.fines_path(), "][ definitely not json").await.unwrap();
        assert_eq!(db.load_ledger().await.unwrap(), Ledger::default());
    }

    #[tokio::test]
    async fn snapshots_roundtrip() {
        let (_dir, db) = database();

        let mut entry = entry();
        let mut reply = Reply {
            id: 1741700000001,
            author: "toby".into(),
            content: "sorry!".into(),
            timestamp: chrono::DateTime::from_timestamp(1_741_700_000, 0).unwrap(),
            edited: None,
            reactions: Default::default(),
        };
        reply.toggle_reaction("👍", "alex");
        entry.replies.push(reply);
        let ledger = Ledger { entries: vec![entry] };

        db.save_ledger(&ledger).await.unwrap();
        assert_eq!(db.load_ledger().await.unwrap(), ledger);
    }

    #[tokio::test]
    async fn legacy_snapshots_without_replies_load() {
        let (_dir, db) = database();
        tokio::fs::write(
            db.fines_path(),
            r#"[{ "id": 1, "date": "2024-11-02", "offender": "Noah", "description": "apology", "amount": -4.0, "proposer": "alex" }]"#,
        )
        .await
        .unwrap();

        let ledger = db.load_ledger().await.unwrap();
        assert_eq!(ledger.entries.len(), 1);
        assert_eq!(ledger.entries[0].kind, EntryKind::Credit);
        assert_eq!(ledger.entries[0].magnitude, 4.0);
        assert!(ledger.entries[0].replies.is_empty());
    }

    #[tokio::test]
    async fn sessions_persist_and_clear() {
        let (_dir, db) = database();
        assert_eq!(db.load_session().await.unwrap(), None);

        db.save_session("alex").await.unwrap();
        assert_eq!(db.load_session().await.unwrap(), Some("alex".into()));

        db.clear_session().await.unwrap();
        assert_eq!(db.load_session().await.unwrap(), None);

        // Clearing twice is not an error
        db.clear_session().await.unwrap();
    }
}
