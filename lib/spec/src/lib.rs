//  LIB.rs
//    by Lut99
//
//  Created:
//    11 Mar 2025, 14:21:50
//  Last edited:
//    03 Apr 2025, 10:02:14
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides public interfaces for things to be compatible with the
//!   fine board library.
//

// Declare modules
pub mod authresolver;
pub mod database;
pub mod model;

// Import some things into the main scope
pub use authresolver::AuthResolver;
pub use database::Database;
