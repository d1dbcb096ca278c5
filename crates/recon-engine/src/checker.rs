use recon_chain::LiveAccount;
use recon_types::{descriptor_contains, AccountRecord, Amount};

use crate::report::Mismatch;

/// Compares one account's snapshot record against its live state.
///
/// Every check runs to completion; all findings are returned together.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReconciliationChecker {
    validate_stake: bool,
}

impl ReconciliationChecker {
    pub fn new(validate_stake: bool) -> Self {
        Self { validate_stake }
    }

    pub fn check_account(&self, expected: &AccountRecord, live: &LiveAccount) -> Vec<Mismatch> {
        let mut found = Vec::new();
        if let Some(m) = check_balance(expected, live) {
            found.push(m);
        }
        if self.validate_stake {
            found.extend(check_stake(expected, live));
        }
        found.extend(check_permissions(expected, live));
        if expected.privileged != live.privileged {
            found.push(Mismatch::Privileged {
                account: expected.name.clone(),
                expected: expected.privileged,
                actual: live.privileged,
            });
        }
        found
    }
}

/// Live liquid + CPU + NET against the snapshot balance.
pub fn check_balance(expected: &AccountRecord, live: &LiveAccount) -> Option<Mismatch> {
    let actual = live.total_balance();
    (actual != expected.balance).then(|| Mismatch::Balance {
        account: expected.name.clone(),
        expected: expected.balance,
        actual,
    })
}

pub fn check_stake(expected: &AccountRecord, live: &LiveAccount) -> Vec<Mismatch> {
    let mut found = Vec::new();
    let cpu = live.cpu_weight();
    if cpu != expected.cpu_stake {
        found.push(Mismatch::CpuStake {
            account: expected.name.clone(),
            expected: expected.cpu_stake,
            actual: cpu,
        });
    }
    let net = live.net_weight();
    if net != expected.net_stake {
        found.push(Mismatch::NetStake {
            account: expected.name.clone(),
            expected: expected.net_stake,
            actual: net,
        });
    }
    found
}

/// Walk live permissions against the snapshot's permission map.
pub fn check_permissions(expected: &AccountRecord, live: &LiveAccount) -> Vec<Mismatch> {
    let mut found = Vec::new();
    let mut matched = 0;
    for permission in &live.permissions {
        let key = permission.key();
        let Some(descriptor) = expected.permissions.get(&key) else {
            found.push(Mismatch::UnexpectedPermission {
                account: expected.name.clone(),
                permission: key,
            });
            continue;
        };
        matched += 1;
        for authority in permission.authorities() {
            if !descriptor_contains(descriptor, &authority) {
                found.push(Mismatch::PermissionAuthority {
                    account: expected.name.clone(),
                    permission: key.clone(),
                    authority,
                    descriptor: descriptor.to_string(),
                });
            }
        }
    }
    if matched != expected.permissions.len() {
        found.push(Mismatch::PermissionCount {
            account: expected.name.clone(),
            expected: expected.permissions.len(),
            matched,
        });
    }
    found
}

/// Snapshot total against the ledger's reported supply.
pub fn check_supply(total_balance: Amount, supply: Amount) -> Option<Mismatch> {
    (total_balance != supply).then(|| Mismatch::Supply {
        expected: total_balance,
        actual: supply,
        delta: supply - total_balance,
    })
}
