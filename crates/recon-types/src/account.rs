use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::permission::PermissionSet;

/// Ledger account identifier, the primary key of the [`AccountModel`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountName(String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountName({})", self.0)
    }
}

impl From<&str> for AccountName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for AccountName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Canonical snapshot representation of one account.
///
/// Built once by the parser and never mutated afterwards. `balance` is always
/// `liquid + cpu_stake + net_stake`; use [`AccountRecord::new`] to keep it so.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub name: AccountName,
    pub pub_key: String,
    pub liquid: Amount,
    pub cpu_stake: Amount,
    pub net_stake: Amount,
    pub balance: Amount,
    pub privileged: bool,
    pub permissions: PermissionSet,
}

impl AccountRecord {
    /// The snapshot carries one staked figure, recorded for both CPU and NET.
    pub fn new(
        name: AccountName,
        pub_key: impl Into<String>,
        liquid: Amount,
        staked: Amount,
        privileged: bool,
        permissions: PermissionSet,
    ) -> Self {
        Self::with_stakes(name, pub_key, liquid, staked, staked, privileged, permissions)
    }

    pub fn with_stakes(
        name: AccountName,
        pub_key: impl Into<String>,
        liquid: Amount,
        cpu_stake: Amount,
        net_stake: Amount,
        privileged: bool,
        permissions: PermissionSet,
    ) -> Self {
        Self {
            name,
            pub_key: pub_key.into(),
            liquid,
            cpu_stake,
            net_stake,
            balance: liquid + cpu_stake + net_stake,
            privileged,
            permissions,
        }
    }

    pub fn total_stake(&self) -> Amount {
        self.cpu_stake + self.net_stake
    }
}

/// In-memory index of every parsed account, ordered by account name.
///
/// Enumeration order is the sorted order of names, which makes batch layout
/// and reports reproducible across runs.
#[derive(Clone, Debug, Default)]
pub struct AccountModel {
    accounts: BTreeMap<AccountName, AccountRecord>,
}

impl AccountModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; a duplicate name replaces the earlier record.
    pub fn insert(&mut self, record: AccountRecord) -> Option<AccountRecord> {
        self.accounts.insert(record.name.clone(), record)
    }

    pub fn get(&self, name: &str) -> Option<&AccountRecord> {
        self.accounts.get(name)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &AccountRecord> {
        self.accounts.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &AccountName> {
        self.accounts.keys()
    }

    /// Sum of `balance` over the records currently held.
    pub fn total_balance(&self) -> Amount {
        self.records().map(|r| r.balance).sum()
    }
}

impl FromIterator<AccountRecord> for AccountModel {
    fn from_iter<I: IntoIterator<Item = AccountRecord>>(iter: I) -> Self {
        let mut model = Self::new();
        for record in iter {
            model.insert(record);
        }
        model
    }
}
