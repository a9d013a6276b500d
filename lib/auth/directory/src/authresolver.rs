//  AUTHRESOLVER.rs
//    by Lut99
//
//  Created:
//    12 Mar 2025, 11:02:37
//  Last edited:
//    02 Apr 2025, 13:30:11
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides the actual [`AuthResolver`] implementation.
//

use std::convert::Infallible;

use specifications::authresolver::AuthenticationFailed;
use specifications::model::{Identity, Role};
use specifications::AuthResolver;
use tracing::{debug, info, span, Level};

use crate::directory::Directory;


/***** LIBRARY *****/
/// Authenticates users against a static [`Directory`] and its shared secret.
#[derive(Clone, Debug)]
pub struct DirectoryResolver {
    /// The directory that decides who exists and who is an admin.
    directory: Directory,
}
impl DirectoryResolver {
    /// Constructor for the DirectoryResolver.
    ///
    /// # Arguments
    /// - `directory`: The [`Directory`] to resolve against.
    ///
    /// # Returns
    /// A new DirectoryResolver ready to turn usernames into identities.
    #[inline]
    pub fn new(directory: Directory) -> Self { Self { directory } }
}
impl AuthResolver for DirectoryResolver {
    // The directory lives in memory; nothing backend-y can break here.
    type Error = Infallible;

    async fn authenticate(&self, username: &str, secret: &str) -> Result<Result<Identity, AuthenticationFailed>, Self::Error> {
        let _span = span!(Level::INFO, "DirectoryResolver::authenticate", username = username);
        info!("Handling login attempt for {username:?}");

        // Membership first; an unknown user's secret is not interesting
        let role: Role = match self.directory.role_of(username) {
            Some(role) => role,
            None => {
                debug!("Username {username:?} is not in the directory");
                return Ok(Err(AuthenticationFailed::UnknownUser { username: username.into() }));
            },
        };
        if secret != self.directory.secret {
            debug!("Secret mismatch for {username:?}");
            return Ok(Err(AuthenticationFailed::IncorrectSecret { username: username.into() }));
        }

        debug!("Resolved {username:?} as {role:?}");
        Ok(Ok(Identity { username: username.into(), role }))
    }

    async fn identify(&self, username: &str) -> Result<Option<Identity>, Self::Error> {
        let _span = span!(Level::INFO, "DirectoryResolver::identify", username = username);
        Ok(self.directory.role_of(username).map(|role| Identity { username: username.into(), role }))
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> DirectoryResolver {
        DirectoryResolver::new(Directory {
            members: vec!["alex".into(), "toby".into()],
            admins:  vec!["alex".into()],
            secret:  "hunter2".into(),
        })
    }

    #[tokio::test]
    async fn members_log_in_with_the_shared_secret() {
        let res = resolver();

        let alex = res.authenticate("alex", "hunter2").await.unwrap().unwrap();
        assert_eq!(alex.username, "alex");
        assert_eq!(alex.role, Role::Admin);

        let toby = res.authenticate("toby", "hunter2").await.unwrap().unwrap();
        assert_eq!(toby.role, Role::Viewer);
    }

    #[tokio::test]
    async fn wrong_secrets_are_rejected() {
        let res = resolver();
        assert!(matches!(res.authenticate("alex", "*******").await, Ok(Err(AuthenticationFailed::IncorrectSecret { .. }))));
    }

    #[tokio::test]
    async fn unknown_users_are_rejected_even_with_the_right_secret() {
        let res = resolver();
        assert!(matches!(res.authenticate("zander", "hunter2").await, Ok(Err(AuthenticationFailed::UnknownUser { .. }))));
    }

    #[tokio::test]
    async fn identify_skips_the_secret_but_not_the_directory() {
        let res = resolver();
        assert_eq!(res.identify("alex").await.unwrap().map(|id| id.role), Some(Role::Admin));
        assert_eq!(res.identify("zander").await.unwrap(), None);
    }
}
