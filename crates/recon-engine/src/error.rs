use std::io;

use recon_chain::ChainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A batch submission failed. Injection stops at the first one.
    #[error("batch {batch} ({operations} operations, accounts {first_account}..={last_account}) rejected: {source}")]
    Injection {
        batch: usize,
        operations: usize,
        first_account: String,
        last_account: String,
        #[source]
        source: ChainError,
    },

    #[error("max batch size {size} cannot hold one account ({per_account} operations)")]
    InvalidBatchSize { size: usize, per_account: usize },

    #[error("validation concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
