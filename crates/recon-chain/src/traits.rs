use async_trait::async_trait;
use recon_types::{AccountName, Asset, Operation};

use crate::error::ChainResult;
use crate::records::{LiveAccount, PushReceipt};

/// Read boundary: live account state and token supply.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn get_account(&self, name: &AccountName) -> ChainResult<LiveAccount>;

    /// Total issued supply of `symbol` as reported by `contract`.
    async fn get_supply(&self, contract: &str, symbol: &str) -> ChainResult<Asset>;
}

/// Write boundary: submit an ordered operation batch as one transaction.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn push_operations(&self, operations: &[Operation]) -> ChainResult<PushReceipt>;
}
