//! Foundation types for recon, the snapshot reconciliation tool.
//!
//! Every other recon crate depends on `recon-types`.
//!
//! # Key Types
//!
//! - [`Amount`]: 4-decimal fixed-precision token quantity
//! - [`Asset`]: amount with a token symbol, `"1.0000 EOS"`
//! - [`AccountRecord`]: canonical parsed snapshot account
//! - [`AccountModel`]: name-ordered index of all records
//! - [`PermissionKey`] / [`PermissionSet`]: expected permission structure
//! - [`Operation`]: a mutating ledger operation
//! - [`RunContext`]: per-invocation counters and the reported supply

pub mod account;
pub mod amount;
pub mod context;
pub mod error;
pub mod operation;
pub mod permission;

pub use account::{AccountModel, AccountName, AccountRecord};
pub use amount::{Amount, Asset, AMOUNT_SCALE};
pub use context::RunContext;
pub use error::TypeError;
pub use operation::{Authority, KeyWeight, Operation};
pub use permission::{descriptor_contains, PermissionKey, PermissionSet, DEFAULT_THRESHOLD};
