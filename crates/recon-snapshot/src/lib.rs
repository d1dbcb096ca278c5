//! Snapshot parsing for recon.
//!
//! A snapshot is comma-delimited text, one account per line, no header:
//!
//! ```text
//! [0] [1] unused
//! [2] account name
//! [3] public key
//! [4] liquid amount
//! [5] staked amount (recorded as both CPU and NET stake)
//! [6] "true" when the account is privileged
//! [7..] permission blob, `;`-separated `name[:descriptor]` entries
//! ```
//!
//! Parsing is synchronous and completes before any other stage starts.

pub mod error;
pub mod parser;

pub use error::{SnapshotError, SnapshotResult};
pub use parser::SnapshotParser;
