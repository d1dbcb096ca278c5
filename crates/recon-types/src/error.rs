use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("invalid asset: {0:?}")]
    InvalidAsset(String),

    #[error("invalid permission key: {0:?}")]
    InvalidPermissionKey(String),
}
