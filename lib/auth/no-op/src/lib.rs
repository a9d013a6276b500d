//  LIB.rs
//    by Lut99
//
//  Created:
//    12 Mar 2025, 11:21:16
//  Last edited:
//    12 Mar 2025, 11:30:48
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements an [`AuthResolver`] that doesn't actually resolve anything.
//

use std::convert::Infallible;

use specifications::authresolver::AuthenticationFailed;
use specifications::model::{Identity, Role};
use specifications::AuthResolver;
use tracing::debug;


/***** LIBRARY *****/
/// Defines an [`AuthResolver`] that doesn't check people whatsoever.
///
/// Whoever shows up is admitted as an admin under whatever name they gave. Strictly for tests
/// and local experiments.
#[derive(Clone, Copy, Debug)]
pub struct NoOpResolver;
impl Default for NoOpResolver {
    #[inline]
    fn default() -> Self { Self::new() }
}
impl NoOpResolver {
    /// Constructor for the NoOpResolver.
    ///
    /// # Returns
    /// A new NoOpResolver ready to do absolutely nothing.
    #[inline]
    pub const fn new() -> Self { Self }
}
impl AuthResolver for NoOpResolver {
    type Error = Infallible;

    #[inline]
    async fn authenticate(&self, username: &str, _secret: &str) -> Result<Result<Identity, AuthenticationFailed>, Self::Error> {
        debug!("Admitting {username:?} without any checks");
        Ok(Ok(Identity { username: username.into(), role: Role::Admin }))
    }

    #[inline]
    async fn identify(&self, username: &str) -> Result<Option<Identity>, Self::Error> {
        Ok(Some(Identity { username: username.into(), role: Role::Admin }))
    }
}
