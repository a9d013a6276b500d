//  BOARD.rs
//    by Lut99
//
//  Created:
//    07 Apr 2025, 09:44:17
//  Last edited:
//    07 Apr 2025, 11:26:40
//  Auto updated?
//    Yes
//
//  Description:
//!   Shows an example fine board session on top of the JSON database
//!   backend: log in, record a fine and a credit, discuss, and tally.
//

use std::path::PathBuf;

use clap::Parser;
use error_trace::trace;
use fine_board::auth::directory::{Directory, DirectoryResolver};
use fine_board::databases::json::JsonDatabase;
use fine_board::models::board::Board;
use fine_board::spec::model::{EntryKind, Identity, LedgerEntry};
use tracing::{error, info, Level};


/***** ARGUMENTS *****/
/// Defines the arguments for this binary.
#[derive(Debug, Parser)]
struct Arguments {
    /// Whether to enable INFO- and DEBUG-level logging.
    #[clap(long)]
    debug: bool,
    /// Whether to enable TRACE-level logging. Implies '--debug'.
    #[clap(long)]
    trace: bool,

    /// The directory in which to create/use the database files.
    #[clap(short, long, default_value = "./fine-board-data")]
    database:  PathBuf,
    /// An optional path to a user directory file. A small built-in club is used if omitted.
    #[clap(short = 'u', long)]
    directory: Option<PathBuf>,
}





/***** HELPER FUNCTIONS *****/
/// Prints one ledger entry with its discussion thread.
fn print_entry(entry: &LedgerEntry) {
    println!("  #{} | {} | {:<8} | {:<24} | ${:>7.2} | by {}", entry.id, entry.date, entry.offender, entry.description, entry.signed_amount(), entry.proposer);
    for reply in &entry.replies {
        let reactions: String = reply.reactions.iter().map(|(emoji, users)| format!(" [{emoji} {}]", users.len())).collect();
        println!("       ↳ {}: {}{}", reply.author, reply.content, reactions);
    }
}





/***** ENTRYPOINT *****/
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse the arguments
    let args = Arguments::parse();

    // Setup the logger
    tracing_subscriber::fmt()
        .with_max_level(if args.trace {
            Level::TRACE
        } else if args.debug {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();
    info!("{} - v{}", env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"));

    // Setup the auth
    let directory: Directory = match args.directory {
        Some(path) => match Directory::from_path(&path).await {
            Ok(directory) => directory,
            Err(err) => {
                error!("{}", trace!(("Failed to load the user directory"), err));
                std::process::exit(1);
            },
        },
        None => Directory {
            members: vec!["alex".into(), "toby".into(), "noah".into(), "zander".into()],
            admins:  vec!["alex".into()],
            secret:  "password123".into(),
        },
    };
    let auth = DirectoryResolver::new(directory);

    // Setup the database and the board on top
    let data = JsonDatabase::new(&args.database);
    let board = Board::new(auth, data);

    // Sign in, preferring whoever was signed in last time (as long as they can record fines)
    let alex: Identity = match board.resume().await {
        Ok(Some(identity)) if identity.role.is_admin() => identity,
        Ok(_) => match board.login("alex", "password123").await {
            Ok(identity) => identity,
            Err(err) => {
                error!("{}", trace!(("Failed to log in as alex"), err));
                std::process::exit(1);
            },
        },
        Err(err) => {
            error!("{}", trace!(("Failed to resume the session"), err));
            std::process::exit(1);
        },
    };
    println!("Signed in as {:?} ({:?})", alex.username, alex.role);

    // Record a fine and a partial credit
    let fine = match board.add_entry(&alex, "Toby", "Late to practice", 10.0, EntryKind::Fine).await {
        Ok(fine) => fine,
        Err(err) => {
            error!("{}", trace!(("Failed to record the fine"), err));
            std::process::exit(1);
        },
    };
    if let Err(err) = board.add_entry(&alex, "Toby", "Brought apology snacks", 4.0, EntryKind::Credit).await {
        error!("{}", trace!(("Failed to record the credit"), err));
        std::process::exit(1);
    }

    // Toby (a viewer) joins the discussion; alex appreciates it
    let toby: Identity = match board.login("toby", "password123").await {
        Ok(identity) => identity,
        Err(err) => {
            error!("{}", trace!(("Failed to log in as toby"), err));
            std::process::exit(1);
        },
    };
    let reply = match board.add_reply(&toby, fine.id, "Sorry all, traffic was wild").await {
        Ok(reply) => reply,
        Err(err) => {
            error!("{}", trace!(("Failed to reply"), err));
            std::process::exit(1);
        },
    };
    if let Err(err) = board.toggle_reaction(&alex, fine.id, reply.id, "👍").await {
        error!("{}", trace!(("Failed to react"), err));
        std::process::exit(1);
    }

    // Show the ledger...
    let ledger = match board.entries().await {
        Ok(ledger) => ledger,
        Err(err) => {
            error!("{}", trace!(("Failed to load the ledger"), err));
            std::process::exit(1);
        },
    };
    println!();
    println!("Ledger ({} entries):", ledger.entries.len());
    for entry in &ledger.entries {
        print_entry(entry);
    }

    // ...and the damage so far
    let totals = match board.totals().await {
        Ok(totals) => totals,
        Err(err) => {
            error!("{}", trace!(("Failed to compute the totals"), err));
            std::process::exit(1);
        },
    };
    println!();
    println!("Totals:");
    for offender in &totals.offenders {
        println!("  {:<8} ${:>7.2} over {} entries", offender.offender, offender.total, offender.entries);
    }
    println!("  Grand total: ${:.2}", totals.grand_total);
}
