//  DATABASE.rs
//    by Lut99
//
//  Created:
//    11 Mar 2025, 15:06:55
//  Last edited:
//    01 Apr 2025, 09:20:31
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines an interface to some backend that stores the ledger and the
//!   current session.
//

use std::error::Error;
use std::future::Future;

use crate::model::Ledger;


/***** LIBRARY *****/
/// Defines how the fine board talks to whatever holds its state.
///
/// The board follows a read-modify-write discipline: every operation loads the full ledger,
/// mutates it in memory and saves the full ledger back. That is acceptable because there is
/// exactly one writer at a time in scope; implementors need not provide any locking.
pub trait Database {
    /// The type of errors returned by this backend.
    type Error: Error;


    // Ledger
    /// Loads the current ledger snapshot.
    ///
    /// # Returns
    /// The persisted [`Ledger`]. A missing or corrupt snapshot degrades to an empty ledger
    /// rather than an error; the ledger is always recomputable state for this system.
    ///
    /// # Errors
    /// This function may error if the backend itself was unreachable (as opposed to merely
    /// holding no snapshot).
    fn load_ledger(&self) -> impl Send + Future<Output = Result<Ledger, Self::Error>>;

    /// Persists the given ledger snapshot, replacing whatever was stored before.
    ///
    /// # Arguments
    /// - `ledger`: The [`Ledger`] to persist.
    ///
    /// # Errors
    /// This function may error if the backend failed to store the snapshot.
    fn save_ledger(&self, ledger: &Ledger) -> impl Send + Future<Output = Result<(), Self::Error>>;


    // Session
    /// Loads the username persisted at the last successful login, if any.
    ///
    /// # Returns
    /// The stored username, or [`None`] if nobody is signed in.
    ///
    /// # Errors
    /// This function may error if the backend itself was unreachable.
    fn load_session(&self) -> impl Send + Future<Output = Result<Option<String>, Self::Error>>;

    /// Persists the given username for future automatic sign-in.
    ///
    /// Only the username is stored; roles are derived on every resolution and secrets are never
    /// written to disk.
    ///
    /// # Arguments
    /// - `username`: The username to persist.
    ///
    /// # Errors
    /// This function may error if the backend failed to store the session.
    fn save_session(&self, username: &str) -> impl Send + Future<Output = Result<(), Self::Error>>;

    /// Clears any persisted session.
    ///
    /// # Errors
    /// This function may error if the backend failed to remove the session.
    fn clear_session(&self) -> impl Send + Future<Output = Result<(), Self::Error>>;
}
