//  LIB.rs
//    by Lut99
//
//  Created:
//    13 Mar 2025, 09:12:40
//  Last edited:
//    13 Mar 2025, 09:14:27
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the [`Database`](specifications::Database) for a
//!   JSON-files-on-disk backend.
//

// Declare modules
mod database;

// Import some of it
pub use database::*;
