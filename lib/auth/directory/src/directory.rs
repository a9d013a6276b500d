//  DIRECTORY.rs
//    by Lut99
//
//  Created:
//    12 Mar 2025, 10:51:02
//  Last edited:
//    02 Apr 2025, 13:28:46
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the static user directory that the resolver consults.
//

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use specifications::model::Role;
use thiserror::Error;
use tracing::{debug, warn};


/***** ERRORS *****/
/// Defines errors originating from loading a [`Directory`] from disk.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Failed to read the directory file at all.
    #[error("Failed to read user directory file {:?}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        err:  std::io::Error,
    },
    /// The directory file was readable but not parsable.
    #[error("Failed to parse user directory file {:?} as a directory", path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        err:  serde_json::Error,
    },
}





/***** LIBRARY *****/
/// The static user directory: who may log in, who of them is an admin, and the one shared secret
/// everybody logs in with.
///
/// There is deliberately no hashing, lockout or rate limiting here; hardening the login is
/// explicitly out of scope for the board.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Directory {
    /// Every username that may log in.
    pub members: Vec<String>,
    /// The sub-list of `members` that gets the admin role.
    #[serde(default)]
    pub admins:  Vec<String>,
    /// The single shared secret.
    pub secret:  String,
}
impl Directory {
    /// Loads a directory from a JSON file.
    ///
    /// # Arguments
    /// - `path`: The path to the file to load.
    ///
    /// # Returns
    /// The parsed [`Directory`].
    ///
    /// # Errors
    /// This function errors if the file could not be read or not be parsed.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path: &Path = path.as_ref();

        debug!("Loading user directory from {:?}...", path.display());
        let raw: String = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) => return Err(DirectoryError::ReadFile { path: path.into(), err }),
        };
        let dir: Self = match serde_json::from_str(&raw) {
            Ok(dir) => dir,
            Err(err) => return Err(DirectoryError::ParseFile { path: path.into(), err }),
        };

        // Admins are supposed to be a sub-list of the members; a stray name would never resolve
        for admin in &dir.admins {
            if !dir.members.contains(admin) {
                warn!("Admin {admin:?} in directory {:?} is not listed as a member and cannot log in", path.display());
            }
        }
        Ok(dir)
    }

    /// Derives the role of the given username.
    ///
    /// # Arguments
    /// - `username`: The username to look up.
    ///
    /// # Returns
    /// [`Role::Admin`] if the username is in the admin sub-list, [`Role::Viewer`] if it is only a
    /// member, or [`None`] if it is not in the directory at all.
    #[inline]
    pub fn role_of(&self, username: &str) -> Option<Role> {
        if !self.members.iter().any(|m| m == username) {
            return None;
        }
        if self.admins.iter().any(|a| a == username) { Some(Role::Admin) } else { Some(Role::Viewer) }
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn directory() -> Directory {
        Directory {
            members: vec!["alex".into(), "toby".into(), "noah".into()],
            admins:  vec!["alex".into()],
            secret:  "hunter2".into(),
        }
    }

    #[test]
    fn roles_are_derived_from_the_sub_list() {
        let dir = directory();
        assert_eq!(dir.role_of("alex"), Some(Role::Admin));
        assert_eq!(dir.role_of("toby"), Some(Role::Viewer));
        assert_eq!(dir.role_of("zander"), None);
    }

    #[tokio::test]
    async fn directories_load_from_json_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "members": ["alex", "toby"], "admins": ["alex"], "secret": "hunter2" }}"#).unwrap();

        let dir = Directory::from_path(file.path()).await.unwrap();
        assert_eq!(dir.members, vec!["alex".to_string(), "toby".to_string()]);
        assert_eq!(dir.role_of("alex"), Some(Role::Admin));
        assert_eq!(dir.secret, "hunter2");
    }

    #[tokio::test]
    async fn missing_directory_files_error() {
        assert!(matches!(Directory::from_path("/definitely/not/here.json").await, Err(DirectoryError::ReadFile { .. })));
    }
}
