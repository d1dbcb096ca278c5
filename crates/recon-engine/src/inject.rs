use recon_chain::LedgerWriter;
use recon_types::{AccountModel, Operation};
use tracing::{error, info};

use crate::batcher::OperationBatcher;
use crate::error::{EngineError, EngineResult};
use crate::report::InjectionReport;

/// Replays the account model as operation batches, strictly one at a time.
///
/// Accounts are enumerated in model order. Each batch is submitted and
/// awaited before the next account is batched, so submissions are totally
/// ordered. The first rejected batch ends the run with
/// [`EngineError::Injection`]; nothing after it is submitted and nothing is
/// retried.
pub struct Injector<'a, W: ?Sized> {
    writer: &'a W,
    batcher: OperationBatcher,
    report: InjectionReport,
}

impl<'a, W: LedgerWriter + ?Sized> Injector<'a, W> {
    pub fn new(writer: &'a W, batcher: OperationBatcher) -> Self {
        Self {
            writer,
            batcher,
            report: InjectionReport::default(),
        }
    }

    pub async fn run(mut self, model: &AccountModel) -> EngineResult<InjectionReport> {
        info!(
            accounts = model.len(),
            max_batch_size = self.batcher.max_batch_size(),
            "injection started"
        );
        for record in model.records() {
            self.report.accounts += 1;
            if let Some(batch) = self.batcher.push_account(record) {
                self.flush(batch).await?;
            }
        }
        if let Some(batch) = self.batcher.finish() {
            self.flush(batch).await?;
        }
        info!(
            accounts = self.report.accounts,
            batches = self.report.batches,
            operations = self.report.operations,
            "injection complete"
        );
        Ok(self.report)
    }

    async fn flush(&mut self, batch: Vec<Operation>) -> EngineResult<()> {
        let index = self.report.batches;
        match self.writer.push_operations(&batch).await {
            Ok(receipt) => {
                info!(
                    batch = index,
                    operations = batch.len(),
                    transaction = %receipt.transaction_id,
                    "batch submitted"
                );
                self.report.batches += 1;
                self.report.operations += batch.len();
                Ok(())
            }
            Err(source) => {
                let dump = serde_json::to_string_pretty(&batch)
                    .unwrap_or_else(|e| format!("<unserializable batch: {e}>"));
                error!(batch = index, error = %source, "batch rejected, aborting injection\n{dump}");
                let account_at = |i: usize| {
                    batch
                        .get(i)
                        .map(|op| op.target().to_string())
                        .unwrap_or_default()
                };
                Err(EngineError::Injection {
                    batch: index,
                    operations: batch.len(),
                    first_account: account_at(0),
                    last_account: account_at(batch.len().saturating_sub(1)),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use recon_chain::{InMemoryLedger, LedgerReader};
    use recon_types::{AccountName, AccountRecord, Amount, PermissionSet};

    use super::*;
    use crate::batcher::InjectionParams;

    fn model(n: usize) -> AccountModel {
        (0..n)
            .map(|i| {
                AccountRecord::new(
                    AccountName::new(format!("acct{i:05}")),
                    "EOS6key",
                    Amount::from_units(10_000),
                    Amount::from_units(5_000),
                    false,
                    PermissionSet::new(),
                )
            })
            .collect()
    }

    fn ledger_for(model: &AccountModel) -> InMemoryLedger {
        let ledger = InMemoryLedger::default();
        ledger.issue(&"eosio".into(), model.total_balance());
        ledger
    }

    fn batcher(max: usize) -> OperationBatcher {
        OperationBatcher::new(InjectionParams::default(), max).unwrap()
    }

    #[tokio::test]
    async fn injects_all_accounts_in_bounded_batches() {
        let model = model(151);
        let ledger = ledger_for(&model);
        let report = Injector::new(&ledger, batcher(600)).run(&model).await.unwrap();
        assert_eq!(
            report,
            InjectionReport {
                accounts: 151,
                batches: 2,
                operations: 604
            }
        );
        let batches = ledger.accepted_batches();
        assert_eq!(batches[0].len(), 600);
        assert_eq!(batches[1].len(), 4);

        let last = ledger.get_account(&"acct00150".into()).await.unwrap();
        assert_eq!(last.total_balance(), Amount::from_units(20_000));
        assert!(ledger.account("eosio").unwrap().liquid().is_zero());
    }

    #[tokio::test]
    async fn batches_follow_enumeration_order() {
        let model = model(6);
        let ledger = ledger_for(&model);
        Injector::new(&ledger, batcher(8)).run(&model).await.unwrap();
        let targets: Vec<String> = ledger
            .accepted_batches()
            .iter()
            .flatten()
            .step_by(4)
            .map(|op| op.target().to_string())
            .collect();
        let names: Vec<String> = model.names().map(ToString::to_string).collect();
        assert_eq!(targets, names);
    }

    #[tokio::test]
    async fn first_rejection_aborts_remaining_batches() {
        let model = model(10);
        let ledger = ledger_for(&model);
        ledger.fail_submission_at(1);
        let err = Injector::new(&ledger, batcher(8)).run(&model).await.unwrap_err();
        match err {
            EngineError::Injection {
                batch,
                operations,
                first_account,
                last_account,
                ..
            } => {
                assert_eq!(batch, 1);
                assert_eq!(operations, 8);
                assert_eq!(first_account, "acct00002");
                assert_eq!(last_account, "acct00003");
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(ledger.submission_count(), 2);
        assert_eq!(ledger.accepted_batches().len(), 1);
        assert!(ledger.account("acct00004").is_none());
    }

    #[tokio::test]
    async fn empty_model_submits_nothing() {
        let ledger = InMemoryLedger::default();
        let report = Injector::new(&ledger, batcher(600))
            .run(&AccountModel::new())
            .await
            .unwrap();
        assert_eq!(report, InjectionReport::default());
        assert_eq!(ledger.submission_count(), 0);
    }
}
