use uuid::Uuid;

use crate::account::AccountRecord;
use crate::amount::Amount;

/// Process-scoped metadata for one invocation.
///
/// Owned by the coordinating flow, which is the only writer. Parser and
/// checkers receive it by `&mut` or `&` respectively.
#[derive(Clone, Debug)]
pub struct RunContext {
    pub run_id: Uuid,
    /// Records produced by the parser, duplicates included.
    pub account_count: u64,
    /// Running sum of `balance` over every produced record, in file order.
    pub total_balance: Amount,
    /// Lines that carried no account name and produced no record.
    pub skipped_lines: u64,
    /// Total issued supply reported by the ledger before validation.
    pub contract_supply: Option<Amount>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            account_count: 0,
            total_balance: Amount::ZERO,
            skipped_lines: 0,
            contract_supply: None,
        }
    }

    pub fn record_account(&mut self, record: &AccountRecord) {
        self.account_count += 1;
        self.total_balance += record.balance;
    }

    pub fn record_skipped_line(&mut self) {
        self.skipped_lines += 1;
    }

    pub fn set_contract_supply(&mut self, supply: Amount) {
        self.contract_supply = Some(supply);
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::PermissionSet;

    #[test]
    fn accumulates_counts_and_balance() {
        let mut ctx = RunContext::new();
        for units in [10_000, 25_000] {
            let r = AccountRecord::new(
                "alice".into(),
                "",
                Amount::from_units(units),
                Amount::ZERO,
                false,
                PermissionSet::new(),
            );
            ctx.record_account(&r);
        }
        assert_eq!(ctx.account_count, 2);
        assert_eq!(ctx.total_balance, Amount::from_units(35_000));
        assert!(ctx.contract_supply.is_none());
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunContext::new().run_id, RunContext::new().run_id);
    }
}
