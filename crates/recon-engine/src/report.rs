use std::collections::BTreeMap;
use std::fmt;

use recon_types::{AccountName, Amount, PermissionKey};
use serde::Serialize;
use tracing::warn;

use crate::checker::check_supply;

/// A difference between snapshot expectation and live ledger state.
///
/// Mismatches are findings, never errors: they are collected and reported,
/// and do not stop a run.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    Balance {
        account: AccountName,
        expected: Amount,
        actual: Amount,
    },
    CpuStake {
        account: AccountName,
        expected: Amount,
        actual: Amount,
    },
    NetStake {
        account: AccountName,
        expected: Amount,
        actual: Amount,
    },
    /// A live permission the snapshot does not list.
    UnexpectedPermission {
        account: AccountName,
        permission: PermissionKey,
    },
    /// A live sub-authority missing from the snapshot descriptor.
    PermissionAuthority {
        account: AccountName,
        permission: PermissionKey,
        authority: String,
        descriptor: String,
    },
    PermissionCount {
        account: AccountName,
        expected: usize,
        matched: usize,
    },
    Privileged {
        account: AccountName,
        expected: bool,
        actual: bool,
    },
    /// Snapshot total against the ledger's issued supply; `delta` is
    /// `actual - expected`.
    Supply {
        expected: Amount,
        actual: Amount,
        delta: Amount,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    Balance,
    CpuStake,
    NetStake,
    UnexpectedPermission,
    PermissionAuthority,
    PermissionCount,
    Privileged,
    Supply,
}

impl Mismatch {
    pub fn kind(&self) -> MismatchKind {
        match self {
            Self::Balance { .. } => MismatchKind::Balance,
            Self::CpuStake { .. } => MismatchKind::CpuStake,
            Self::NetStake { .. } => MismatchKind::NetStake,
            Self::UnexpectedPermission { .. } => MismatchKind::UnexpectedPermission,
            Self::PermissionAuthority { .. } => MismatchKind::PermissionAuthority,
            Self::PermissionCount { .. } => MismatchKind::PermissionCount,
            Self::Privileged { .. } => MismatchKind::Privileged,
            Self::Supply { .. } => MismatchKind::Supply,
        }
    }

    /// The account concerned; `None` for the run-wide supply check.
    pub fn account(&self) -> Option<&AccountName> {
        match self {
            Self::Balance { account, .. }
            | Self::CpuStake { account, .. }
            | Self::NetStake { account, .. }
            | Self::UnexpectedPermission { account, .. }
            | Self::PermissionAuthority { account, .. }
            | Self::PermissionCount { account, .. }
            | Self::Privileged { account, .. } => Some(account),
            Self::Supply { .. } => None,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Balance {
                account,
                expected,
                actual,
            } => write!(f, "{account}: balance mismatch, snapshot {expected} vs chain {actual}"),
            Self::CpuStake {
                account,
                expected,
                actual,
            } => write!(f, "{account}: cpu stake mismatch, snapshot {expected} vs chain {actual}"),
            Self::NetStake {
                account,
                expected,
                actual,
            } => write!(f, "{account}: net stake mismatch, snapshot {expected} vs chain {actual}"),
            Self::UnexpectedPermission {
                account,
                permission,
            } => write!(f, "{account}: unexpected permission {permission}"),
            Self::PermissionAuthority {
                account,
                permission,
                authority,
                descriptor,
            } => write!(
                f,
                "{account}: permission mismatch on {permission}, {authority} not in {descriptor:?}"
            ),
            Self::PermissionCount {
                account,
                expected,
                matched,
            } => write!(
                f,
                "{account}: permission count mismatch, snapshot {expected} vs matched {matched}"
            ),
            Self::Privileged {
                account,
                expected,
                actual,
            } => write!(f, "{account}: privileged mismatch, snapshot {expected} vs chain {actual}"),
            Self::Supply {
                expected,
                actual,
                delta,
            } => write!(
                f,
                "supply mismatch: snapshot total {expected} vs chain supply {actual} (delta {delta})"
            ),
        }
    }
}

/// A live-state query that failed for one account; the run continued.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct QueryFailure {
    pub account: AccountName,
    pub error: String,
}

/// Outcome of a validation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub accounts_total: usize,
    /// Accounts whose live state was fetched and compared.
    pub accounts_checked: usize,
    /// Checked accounts whose total balance matched.
    pub accounts_balanced: usize,
    pub query_failures: Vec<QueryFailure>,
    pub mismatches: Vec<Mismatch>,
    pub supply_checked: bool,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.query_failures.is_empty() && self.mismatches.is_empty()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<MismatchKind, usize> {
        let mut counts = BTreeMap::new();
        for m in &self.mismatches {
            *counts.entry(m.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn supply_mismatch(&self) -> Option<&Mismatch> {
        self.mismatches
            .iter()
            .find(|m| m.kind() == MismatchKind::Supply)
    }

    /// Compare the snapshot total with the ledger's supply, keeping any mismatch.
    pub fn record_supply(&mut self, total_balance: Amount, supply: Amount) {
        self.supply_checked = true;
        if let Some(mismatch) = check_supply(total_balance, supply) {
            warn!("{mismatch}");
            self.mismatches.push(mismatch);
            self.sort();
        }
    }

    /// Order findings by account, then kind, independent of completion order.
    pub(crate) fn sort(&mut self) {
        self.mismatches
            .sort_by(|a, b| a.account().cmp(&b.account()).then_with(|| a.cmp(b)));
        self.query_failures.sort();
    }
}

/// Outcome of an injection pass that ran to completion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InjectionReport {
    pub accounts: usize,
    pub batches: usize,
    pub operations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_groups_by_account_with_supply_first() {
        let mut report = ValidationReport {
            mismatches: vec![
                Mismatch::Privileged {
                    account: "bob".into(),
                    expected: true,
                    actual: false,
                },
                Mismatch::Balance {
                    account: "bob".into(),
                    expected: Amount::ZERO,
                    actual: Amount::from_units(1),
                },
                Mismatch::Supply {
                    expected: Amount::ZERO,
                    actual: Amount::from_units(1),
                    delta: Amount::from_units(1),
                },
                Mismatch::UnexpectedPermission {
                    account: "alice".into(),
                    permission: PermissionKey::new("owner", 1),
                },
            ],
            ..Default::default()
        };
        report.sort();
        let kinds: Vec<_> = report.mismatches.iter().map(Mismatch::kind).collect();
        assert_eq!(
            kinds,
            [
                MismatchKind::Supply,
                MismatchKind::UnexpectedPermission,
                MismatchKind::Balance,
                MismatchKind::Privileged
            ]
        );
    }

    #[test]
    fn counts_and_cleanliness() {
        let mut report = ValidationReport::default();
        assert!(report.is_clean());
        report.mismatches.push(Mismatch::PermissionCount {
            account: "a".into(),
            expected: 2,
            matched: 1,
        });
        assert!(!report.is_clean());
        assert_eq!(report.counts_by_kind()[&MismatchKind::PermissionCount], 1);
        assert!(report.supply_mismatch().is_none());
    }

    #[test]
    fn supply_recorded_once_per_check() {
        let total: Amount = "1000000.0000".parse().unwrap();
        let mut clean = ValidationReport::default();
        clean.record_supply(total, total);
        assert!(clean.supply_checked);
        assert!(clean.mismatches.is_empty());

        let mut off = ValidationReport::default();
        off.record_supply(total, total - Amount::from_units(1));
        assert_eq!(off.counts_by_kind()[&MismatchKind::Supply], 1);
        let Some(Mismatch::Supply { delta, .. }) = off.supply_mismatch() else {
            panic!("supply mismatch expected");
        };
        assert_eq!(delta.to_string(), "-0.0001");
    }

    #[test]
    fn display_names_account_and_both_values() {
        let m = Mismatch::Balance {
            account: "alice".into(),
            expected: Amount::from_units(10_000),
            actual: Amount::from_units(9_999),
        };
        assert_eq!(
            m.to_string(),
            "alice: balance mismatch, snapshot 1.0000 vs chain 0.9999"
        );
    }
}
