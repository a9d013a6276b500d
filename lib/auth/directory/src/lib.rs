//  LIB.rs
//    by Lut99
//
//  Created:
//    12 Mar 2025, 10:44:21
//  Last edited:
//    12 Mar 2025, 10:49:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements an [`AuthResolver`](specifications::AuthResolver) over a
//!   static user directory with a shared secret.
//

// Declare modules
mod authresolver;
mod directory;

// Import some of it
pub use authresolver::*;
pub use directory::*;
