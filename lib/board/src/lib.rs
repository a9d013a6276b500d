//  LIB.rs
//    by Lut99
//
//  Created:
//    14 Mar 2025, 13:40:19
//  Last edited:
//    04 Apr 2025, 10:55:03
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the fine board itself: the role-gated ledger operations over
//!   pluggable auth and storage.
//

// Declare modules
mod board;
mod ops;
mod totals;

// Import some of it
pub use board::*;
pub use totals::*;
