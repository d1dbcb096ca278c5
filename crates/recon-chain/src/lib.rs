//! Remote ledger boundary for recon.
//!
//! The ledger node is an external collaborator. This crate fixes its interface
//! ([`LedgerReader`], [`LedgerWriter`]) and ships two implementations:
//! [`HttpLedger`] for a live node, and [`InMemoryLedger`] for tests and dry
//! runs.

pub mod endpoint;
pub mod error;
pub mod http;
pub mod memory;
pub mod records;
pub mod traits;

pub use endpoint::endpoints;
pub use error::{ChainError, ChainResult};
pub use http::HttpLedger;
pub use memory::InMemoryLedger;
pub use records::{
    CurrencyStats, LiveAccount, LivePermission, PermissionLevel, PermissionLevelWeight,
    PushReceipt, RequiredAuth, ResourceStake,
};
pub use traits::{LedgerReader, LedgerWriter};
