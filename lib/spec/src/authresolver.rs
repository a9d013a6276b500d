//  AUTHRESOLVER.rs
//    by Lut99
//
//  Created:
//    11 Mar 2025, 14:52:19
//  Last edited:
//    01 Apr 2025, 09:17:44
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the [`AuthResolver`] trait, which can take a login attempt
//!   and use it to resolve an identity and role.
//

use std::error::Error;
use std::future::Future;

use crate::model::Identity;


/***** AUXILLARY *****/
/// The client-side reason a login attempt was rejected.
///
/// These are the errors the user can fix by typing something else; anything the resolver's
/// backend breaks on is reported through [`AuthResolver::Error`] instead.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationFailed {
    /// The username is not in the user directory.
    #[error("Unknown username {username:?}")]
    UnknownUser { username: String },
    /// The username exists, but the given secret does not match the shared secret.
    #[error("Incorrect secret for user {username:?}")]
    IncorrectSecret { username: String },
}





/***** LIBRARY *****/
/// A resolver that takes a login attempt and (hopefully) resolves who is attempting it.
///
/// Note that resolvers are intended to be shared by everything that authenticates. As such, any
/// reference to `self` is done immutably only.
pub trait AuthResolver {
    /// Errors produced by the resolver's own machinery (e.g., an unreadable directory). Distinct
    /// from [`AuthenticationFailed`], which the _user_ caused.
    type Error: Error;


    /// Resolves the given username/secret pair to an [`Identity`].
    ///
    /// Succeeds if and only if the secret matches the configured shared secret AND the username
    /// is a member of the user directory. The role is derived, not stored: admin if the username
    /// is in the directory's admin sub-list, viewer otherwise.
    ///
    /// # Arguments
    /// - `username`: The username of whoever is logging in.
    /// - `secret`: The shared secret as the user entered it.
    ///
    /// # Returns
    /// An [`Identity`] carrying the username and the derived [`Role`](crate::model::Role).
    ///
    /// # Errors
    /// This function can error at two levels:
    /// - The _outer_ [`Result`] is used to indicate resolver errors (e.g., directory
    ///   unreachable); and
    /// - The _inner_ [`Result`] is used to indicate credential errors (unknown user, wrong
    ///   secret).
    fn authenticate(&self, username: &str, secret: &str)
    -> impl Send + Future<Output = Result<Result<Identity, AuthenticationFailed>, Self::Error>>;

    /// Resolves a bare username to an [`Identity`], without checking any secret.
    ///
    /// This backs automatic sign-in from a persisted session: only the username is stored, so
    /// the role must be derived afresh every time rather than trusted from disk.
    ///
    /// # Arguments
    /// - `username`: The username to look up.
    ///
    /// # Returns
    /// The resolved [`Identity`], or [`None`] if the username is not (or no longer) in the user
    /// directory.
    ///
    /// # Errors
    /// This function errors if the resolver itself failed to consult its directory.
    fn identify(&self, username: &str) -> impl Send + Future<Output = Result<Option<Identity>, Self::Error>>;
}
