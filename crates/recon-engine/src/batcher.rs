use std::mem;

use recon_types::{AccountName, AccountRecord, Asset, Authority, Operation};

use crate::error::{EngineError, EngineResult};

/// Upper bound on operations per submitted batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 600;

/// Every account expands to exactly this many operations.
pub const OPERATIONS_PER_ACCOUNT: usize = 4;

/// Fixed parameters of the operations generated for each account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectionParams {
    /// Account that creates identities, pays for storage, and funds stake and transfers.
    pub creator: AccountName,
    pub token_symbol: String,
    pub ram_bytes: u32,
    pub memo: String,
}

impl Default for InjectionParams {
    fn default() -> Self {
        Self {
            creator: AccountName::from("eosio"),
            token_symbol: "EOS".into(),
            ram_bytes: 8192,
            memo: "genesis snapshot".into(),
        }
    }
}

impl InjectionParams {
    /// The operations that recreate `record`, in submission order: create
    /// identity, allocate storage, delegate stake, transfer liquid balance.
    pub fn account_operations(&self, record: &AccountRecord) -> [Operation; OPERATIONS_PER_ACCOUNT] {
        let asset = |amount| Asset::new(amount, self.token_symbol.clone());
        [
            Operation::NewAccount {
                creator: self.creator.clone(),
                name: record.name.clone(),
                owner: Authority::single_key(record.pub_key.clone()),
                active: Authority::single_key(record.pub_key.clone()),
            },
            Operation::BuyRamBytes {
                payer: self.creator.clone(),
                receiver: record.name.clone(),
                bytes: self.ram_bytes,
            },
            Operation::DelegateBandwidth {
                from: self.creator.clone(),
                receiver: record.name.clone(),
                stake_net_quantity: asset(record.net_stake),
                stake_cpu_quantity: asset(record.cpu_stake),
                transfer: true,
            },
            Operation::Transfer {
                from: self.creator.clone(),
                to: record.name.clone(),
                quantity: asset(record.liquid),
                memo: self.memo.clone(),
            },
        ]
    }
}

/// Accumulates per-account operations into bounded batches.
///
/// An account's operations always land in the same batch. A batch is handed
/// back as soon as it cannot take another account without exceeding
/// `max_batch_size`.
#[derive(Debug)]
pub struct OperationBatcher {
    params: InjectionParams,
    max_batch_size: usize,
    pending: Vec<Operation>,
}

impl OperationBatcher {
    pub fn new(params: InjectionParams, max_batch_size: usize) -> EngineResult<Self> {
        if max_batch_size < OPERATIONS_PER_ACCOUNT {
            return Err(EngineError::InvalidBatchSize {
                size: max_batch_size,
                per_account: OPERATIONS_PER_ACCOUNT,
            });
        }
        Ok(Self {
            params,
            max_batch_size,
            pending: Vec::with_capacity(max_batch_size),
        })
    }

    /// Append one account; returns a full batch if one is ready to flush.
    pub fn push_account(&mut self, record: &AccountRecord) -> Option<Vec<Operation>> {
        self.pending.extend(self.params.account_operations(record));
        if self.pending.len() + OPERATIONS_PER_ACCOUNT > self.max_batch_size {
            return Some(self.take());
        }
        None
    }

    /// Remaining partial batch at end of run, if any.
    pub fn finish(&mut self) -> Option<Vec<Operation>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    fn take(&mut self) -> Vec<Operation> {
        mem::replace(&mut self.pending, Vec::with_capacity(self.max_batch_size))
    }
}

#[cfg(test)]
mod tests {
    use recon_types::{Amount, PermissionSet};

    use super::*;

    fn record(i: usize) -> AccountRecord {
        AccountRecord::new(
            AccountName::new(format!("acct{i:05}")),
            "EOS6key",
            Amount::from_units(12_345),
            Amount::from_units(5_000),
            false,
            PermissionSet::new(),
        )
    }

    fn run(accounts: usize, max: usize) -> Vec<Vec<Operation>> {
        let mut batcher = OperationBatcher::new(InjectionParams::default(), max).unwrap();
        let mut batches = Vec::new();
        for i in 0..accounts {
            batches.extend(batcher.push_account(&record(i)));
        }
        batches.extend(batcher.finish());
        batches
    }

    #[test]
    fn operations_follow_fixed_order() {
        let ops = InjectionParams::default().account_operations(&record(1));
        let names: Vec<_> = ops.iter().map(Operation::type_name).collect();
        assert_eq!(names, ["newaccount", "buyrambytes", "delegatebw", "transfer"]);
        match &ops[2] {
            Operation::DelegateBandwidth {
                stake_cpu_quantity,
                stake_net_quantity,
                transfer,
                ..
            } => {
                assert_eq!(stake_cpu_quantity.to_string(), "0.5000 EOS");
                assert_eq!(stake_net_quantity.to_string(), "0.5000 EOS");
                assert!(*transfer);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &ops[3] {
            Operation::Transfer { quantity, memo, .. } => {
                assert_eq!(quantity.to_string(), "1.2345 EOS");
                assert_eq!(memo, "genesis snapshot");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn identity_uses_key_on_both_levels() {
        let ops = InjectionParams::default().account_operations(&record(1));
        let Operation::NewAccount { owner, active, .. } = &ops[0] else {
            panic!("first operation must create the identity");
        };
        assert_eq!(owner, &Authority::single_key("EOS6key"));
        assert_eq!(active, owner);
    }

    #[test]
    fn exactly_full_batch_flushes_once() {
        let mut batcher = OperationBatcher::new(InjectionParams::default(), 600).unwrap();
        let mut flushed = Vec::new();
        for i in 0..150 {
            flushed.extend(batcher.push_account(&record(i)));
        }
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].len(), 600);
        assert_eq!(batcher.pending_len(), 0);
        assert!(batcher.finish().is_none());
    }

    #[test]
    fn one_extra_account_yields_tail_batch() {
        let batches = run(151, 600);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 600);
        assert_eq!(batches[1].len(), 4);
    }

    #[test]
    fn accounts_never_split_across_batches() {
        let batches = run(10, 10);
        assert!(batches.iter().all(|b| b.len() <= 10));
        assert!(batches.iter().all(|b| b.len() % OPERATIONS_PER_ACCOUNT == 0));
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 40);
        for batch in &batches {
            for chunk in batch.chunks(OPERATIONS_PER_ACCOUNT) {
                assert!(chunk.iter().all(|op| op.target() == chunk[0].target()));
            }
        }
    }

    #[test]
    fn no_accounts_no_batches() {
        assert!(run(0, 600).is_empty());
    }

    #[test]
    fn rejects_batch_size_below_one_account() {
        assert!(matches!(
            OperationBatcher::new(InjectionParams::default(), 3),
            Err(EngineError::InvalidBatchSize { size: 3, .. })
        ));
    }
}
