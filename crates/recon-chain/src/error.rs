use thiserror::Error;

/// Errors produced at the remote ledger boundary.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("unknown token {symbol} on {contract}")]
    UnknownToken { contract: String, symbol: String },

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("no signing key configured for submission")]
    MissingSigner,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("digest error: {0}")]
    Digest(#[from] recon_crypto::DigestError),
}

pub type ChainResult<T> = Result<T, ChainError>;
