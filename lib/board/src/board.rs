//  BOARD.rs
//    by Lut99
//
//  Created:
//    14 Mar 2025, 13:42:50
//  Last edited:
//    04 Apr 2025, 11:31:26
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the [`Board`] and its session flow (login, resume, logout).
//

use specifications::authresolver::AuthenticationFailed;
use specifications::model::Identity;
use specifications::{AuthResolver, Database};
use thiserror::Error;
use tracing::{info, span, warn, Level};


/***** ERRORS *****/
/// Defines rejections of user input to one of the board's operations.
///
/// These are always recoverable: the attempted mutation is simply not applied, and nothing has
/// been persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// An entry was given without an offender.
    #[error("The offender may not be empty")]
    EmptyOffender,
    /// An entry was given without a description.
    #[error("The description may not be empty")]
    EmptyDescription,
    /// A reply was given without any content.
    #[error("The reply content may not be empty")]
    EmptyContent,
    /// An amount was not a valid non-negative number.
    #[error("The amount must be a non-negative number, got {amount}")]
    InvalidAmount { amount: f64 },
}

/// Defines errors emitted by the [`Board`].
///
/// The first handful are the user-facing kinds (bad credentials, missing permissions, rejected
/// input, unknown ids); the final two wrap whatever the plugged-in resolver or database broke on.
#[derive(Debug, Error)]
pub enum Error<A, D> {
    /// The login attempt was rejected.
    #[error("Failed to log in")]
    AuthenticationFailed {
        #[source]
        err: AuthenticationFailed,
    },
    /// A role-gated operation was attempted by somebody without the role.
    #[error("User {username:?} is not allowed to {action}")]
    PermissionDenied { username: String, action: &'static str },
    /// The operation's input was rejected.
    #[error("Invalid input")]
    Validation {
        #[source]
        err: ValidationError,
    },
    /// An operation referred to an entry that is not in the ledger.
    #[error("No entry with id {id} in the ledger")]
    EntryNotFound { id: u64 },
    /// An operation referred to a reply that is not on the given entry.
    #[error("No reply with id {reply} on entry {entry}")]
    ReplyNotFound { entry: u64, reply: u64 },
    /// The auth resolver itself failed.
    #[error("Failed to resolve identity")]
    Auth {
        #[source]
        err: A,
    },
    /// The backend database failed.
    #[error("Failed to talk to the backend database")]
    Data {
        #[source]
        err: D,
    },
}





/***** LIBRARY *****/
/// The fine board: the club's fines-and-credits ledger with its discussion threads.
///
/// The board owns no state of its own. Every operation reads the full ledger from the plugged-in
/// [`Database`], mutates it in memory and writes it back, synchronously to completion; identities
/// come from the plugged-in [`AuthResolver`] and are passed to each operation explicitly.
pub struct Board<A, D> {
    /// The auth resolver for resolving identities.
    pub(crate) auth: A,
    /// The database holding the ledger and the session.
    pub(crate) data: D,
}
impl<A, D> Board<A, D> {
    /// Constructor for the Board.
    ///
    /// # Arguments
    /// - `auth`: The [`AuthResolver`] used to turn login attempts into identities.
    /// - `data`: The [`Database`] that holds the ledger and the persisted session.
    ///
    /// # Returns
    /// A new Board, ready to collect fines.
    #[inline]
    pub fn new(auth: A, data: D) -> Self { Self { auth, data } }
}
impl<A: AuthResolver, D: Database> Board<A, D> {
    /// Logs a user in and persists the session for future automatic sign-in.
    ///
    /// # Arguments
    /// - `username`: The username of whoever is logging in.
    /// - `secret`: The shared secret as the user entered it.
    ///
    /// # Returns
    /// The resolved [`Identity`], to be passed to subsequent operations.
    ///
    /// # Errors
    /// This function errors with [`Error::AuthenticationFailed`] on bad credentials, or with
    /// [`Error::Auth`]/[`Error::Data`] if the resolver or session store broke.
    pub async fn login(&self, username: &str, secret: &str) -> Result<Identity, Error<A::Error, D::Error>> {
        let _span = span!(Level::INFO, "Board::login", username = username);

        let identity: Identity = match self.auth.authenticate(username, secret).await {
            Ok(Ok(identity)) => identity,
            Ok(Err(err)) => return Err(Error::AuthenticationFailed { err }),
            Err(err) => return Err(Error::Auth { err }),
        };
        if let Err(err) = self.data.save_session(&identity.username).await {
            return Err(Error::Data { err });
        }

        info!("Logged in {:?} with role {:?}", identity.username, identity.role);
        Ok(identity)
    }

    /// Signs in automatically from a previously persisted session, if any.
    ///
    /// The role is re-derived through the resolver rather than trusted from disk; a persisted
    /// username that has since left the directory clears the stale session.
    ///
    /// # Returns
    /// The resolved [`Identity`], or [`None`] if nobody is signed in.
    ///
    /// # Errors
    /// This function errors if the resolver or the session store broke.
    pub async fn resume(&self) -> Result<Option<Identity>, Error<A::Error, D::Error>> {
        let _span = span!(Level::INFO, "Board::resume");

        let username: String = match self.data.load_session().await {
            Ok(Some(username)) => username,
            Ok(None) => return Ok(None),
            Err(err) => return Err(Error::Data { err }),
        };
        match self.auth.identify(&username).await {
            Ok(Some(identity)) => {
                info!("Resumed session for {:?} with role {:?}", identity.username, identity.role);
                Ok(Some(identity))
            },
            Ok(None) => {
                warn!("Persisted session for {username:?}, who is no longer in the directory; clearing it");
                if let Err(err) = self.data.clear_session().await {
                    return Err(Error::Data { err });
                }
                Ok(None)
            },
            Err(err) => Err(Error::Auth { err }),
        }
    }

    /// Signs out, clearing any persisted session.
    ///
    /// # Errors
    /// This function errors if the session store broke.
    pub async fn logout(&self) -> Result<(), Error<A::Error, D::Error>> {
        let _span = span!(Level::INFO, "Board::logout");

        match self.data.clear_session().await {
            Ok(_) => {
                info!("Signed out");
                Ok(())
            },
            Err(err) => Err(Error::Data { err }),
        }
    }
}
