//  LIB.rs
//    by Lut99
//
//  Created:
//    11 Mar 2025, 14:09:36
//  Last edited:
//    04 Apr 2025, 13:31:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Keeps a club's fines-and-credits ledger, with role-gated mutations
//!   and threaded discussion.
//

// Import the libraries
pub mod models {
    #[cfg(feature = "board-model")]
    pub use board_model as board;
}

pub mod auth {
    #[cfg(feature = "directory-auth")]
    pub use directory_auth as directory;
    #[cfg(feature = "no-op-auth")]
    pub use no_op_auth as no_op;
}

pub mod databases {
    #[cfg(feature = "json-database")]
    pub use json_database as json;
}

pub use specifications as spec;
