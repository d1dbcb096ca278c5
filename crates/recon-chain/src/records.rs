use recon_types::{AccountName, Amount, Asset, KeyWeight, PermissionKey};
use serde::{Deserialize, Serialize};

/// Live state of one account as reported by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveAccount {
    pub account_name: AccountName,
    #[serde(default)]
    pub privileged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_liquid_balance: Option<Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_delegated_bandwidth: Option<ResourceStake>,
    #[serde(default)]
    pub ram_quota: u64,
    #[serde(default)]
    pub permissions: Vec<LivePermission>,
}

impl LiveAccount {
    pub fn new(name: AccountName) -> Self {
        Self {
            account_name: name,
            privileged: false,
            core_liquid_balance: None,
            self_delegated_bandwidth: None,
            ram_quota: 0,
            permissions: Vec::new(),
        }
    }

    /// Liquid balance, zero when the ledger reports none.
    pub fn liquid(&self) -> Amount {
        self.core_liquid_balance
            .as_ref()
            .map(|a| a.amount)
            .unwrap_or(Amount::ZERO)
    }

    /// CPU weight, zero when the account has no resource record.
    pub fn cpu_weight(&self) -> Amount {
        self.self_delegated_bandwidth
            .as_ref()
            .map(|r| r.cpu_weight.amount)
            .unwrap_or(Amount::ZERO)
    }

    pub fn net_weight(&self) -> Amount {
        self.self_delegated_bandwidth
            .as_ref()
            .map(|r| r.net_weight.amount)
            .unwrap_or(Amount::ZERO)
    }

    /// Liquid plus both staked components.
    pub fn total_balance(&self) -> Amount {
        self.liquid() + self.cpu_weight() + self.net_weight()
    }
}

/// Tokens the account has staked to itself for CPU and NET.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStake {
    pub cpu_weight: Asset,
    pub net_weight: Asset,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePermission {
    pub perm_name: String,
    #[serde(default)]
    pub parent: String,
    pub required_auth: RequiredAuth,
}

impl LivePermission {
    /// Composite `name(threshold)` key, comparable with snapshot permissions.
    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(self.perm_name.clone(), self.required_auth.threshold)
    }

    /// Sub-authorities rendered as `actor@permission`.
    pub fn authorities(&self) -> impl Iterator<Item = String> + '_ {
        self.required_auth
            .accounts
            .iter()
            .map(|a| format!("{}@{}", a.permission.actor, a.permission.permission))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAuth {
    pub threshold: u32,
    #[serde(default)]
    pub keys: Vec<KeyWeight>,
    #[serde(default)]
    pub accounts: Vec<PermissionLevelWeight>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevelWeight {
    pub permission: PermissionLevel,
    pub weight: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: String,
    pub permission: String,
}

/// Token statistics as returned by the currency stats query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyStats {
    pub supply: Asset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_supply: Option<Asset>,
    #[serde(default)]
    pub issuer: String,
}

/// Acknowledgement of an accepted batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReceipt {
    pub transaction_id: String,
    pub operation_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_ACCOUNT_JSON: &str = r#"{
        "account_name": "alice",
        "privileged": false,
        "core_liquid_balance": "10.0000 EOS",
        "self_delegated_bandwidth": {
            "from": "alice", "to": "alice",
            "net_weight": "2.5000 EOS", "cpu_weight": "2.5000 EOS"
        },
        "ram_quota": 8192,
        "permissions": [
            {"perm_name": "active", "parent": "owner",
             "required_auth": {"threshold": 2,
                "keys": [{"key": "EOS6abc", "weight": 1}],
                "accounts": [{"permission": {"actor": "bob", "permission": "active"}, "weight": 1}],
                "waits": []}}
        ]
    }"#;

    #[test]
    fn decodes_node_account_response() {
        let account: LiveAccount = serde_json::from_str(GET_ACCOUNT_JSON).unwrap();
        assert_eq!(account.liquid(), Amount::from_units(100_000));
        assert_eq!(account.cpu_weight(), Amount::from_units(25_000));
        assert_eq!(account.total_balance(), Amount::from_units(150_000));
        let perm = &account.permissions[0];
        assert_eq!(perm.key().to_string(), "active(2)");
        assert_eq!(perm.authorities().collect::<Vec<_>>(), vec!["bob@active"]);
    }

    #[test]
    fn absent_components_are_zero() {
        let account: LiveAccount = serde_json::from_str(r#"{"account_name": "bare"}"#).unwrap();
        assert!(account.liquid().is_zero());
        assert!(account.cpu_weight().is_zero());
        assert!(account.net_weight().is_zero());
        assert!(!account.privileged);
        assert!(account.permissions.is_empty());
    }
}
