use serde::{Deserialize, Serialize};

use crate::account::AccountName;
use crate::amount::Asset;

/// A public key holding weight within an [`Authority`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWeight {
    pub key: String,
    pub weight: u16,
}

/// Signing authority installed on a permission level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub threshold: u32,
    pub keys: Vec<KeyWeight>,
}

impl Authority {
    /// One key with weight 1 satisfying a threshold of 1.
    pub fn single_key(key: impl Into<String>) -> Self {
        Self {
            threshold: 1,
            keys: vec![KeyWeight {
                key: key.into(),
                weight: 1,
            }],
        }
    }
}

/// A state-mutating operation submitted to the remote ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Operation {
    /// Create an identity with `owner` and `active` authorities.
    NewAccount {
        creator: AccountName,
        name: AccountName,
        owner: Authority,
        active: Authority,
    },
    /// Allocate a fixed amount of storage for `receiver`.
    BuyRamBytes {
        payer: AccountName,
        receiver: AccountName,
        bytes: u32,
    },
    DelegateBandwidth {
        from: AccountName,
        receiver: AccountName,
        stake_net_quantity: Asset,
        stake_cpu_quantity: Asset,
        transfer: bool,
    },
    Transfer {
        from: AccountName,
        to: AccountName,
        quantity: Asset,
        memo: String,
    },
}

impl Operation {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NewAccount { .. } => "newaccount",
            Self::BuyRamBytes { .. } => "buyrambytes",
            Self::DelegateBandwidth { .. } => "delegatebw",
            Self::Transfer { .. } => "transfer",
        }
    }

    /// The account whose state this operation establishes.
    pub fn target(&self) -> &AccountName {
        match self {
            Self::NewAccount { name, .. } => name,
            Self::BuyRamBytes { receiver, .. } => receiver,
            Self::DelegateBandwidth { receiver, .. } => receiver,
            Self::Transfer { to, .. } => to,
        }
    }
}
