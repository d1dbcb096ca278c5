use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use recon_chain::LedgerReader;
use recon_types::{AccountModel, AccountName};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::checker::ReconciliationChecker;
use crate::error::{EngineError, EngineResult};
use crate::report::{Mismatch, QueryFailure, ValidationReport};

/// Ceiling on concurrently outstanding account queries.
pub const DEFAULT_VALIDATE_CONCURRENCY: usize = 8;

/// Balanced accounts between progress lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

#[derive(Clone, Debug)]
pub struct ValidationOptions {
    pub concurrency: usize,
    pub validate_stake: bool,
    pub progress_interval: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_VALIDATE_CONCURRENCY,
            validate_stake: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

enum AccountOutcome {
    Checked(Vec<Mismatch>),
    QueryFailed(QueryFailure),
}

/// Read-only comparison of every model account against live ledger state.
///
/// Queries run on a bounded pool: a semaphore holds `concurrency` permits and
/// a task is spawned only once it owns one. A failed query is recorded and
/// the remaining accounts are still validated. The model is shared read-only
/// with the tasks.
pub struct Validator<R: ?Sized> {
    reader: Arc<R>,
    options: ValidationOptions,
}

impl<R: LedgerReader + ?Sized + 'static> Validator<R> {
    pub fn new(reader: Arc<R>, options: ValidationOptions) -> EngineResult<Self> {
        if options.concurrency == 0 {
            return Err(EngineError::InvalidConcurrency);
        }
        Ok(Self { reader, options })
    }

    pub async fn run(&self, model: Arc<AccountModel>) -> ValidationReport {
        let total = model.len();
        info!(
            accounts = total,
            concurrency = self.options.concurrency,
            stake = self.options.validate_stake,
            "validation started"
        );

        let permits = Arc::new(Semaphore::new(self.options.concurrency));
        let balanced = Arc::new(AtomicUsize::new(0));
        let checker = ReconciliationChecker::new(self.options.validate_stake);
        let mut tasks = JoinSet::new();

        for name in model.names() {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .expect("validation semaphore closed");
            let name = name.clone();
            let reader = Arc::clone(&self.reader);
            let model = Arc::clone(&model);
            let balanced = Arc::clone(&balanced);
            let interval = self.options.progress_interval;
            tasks.spawn(async move {
                let outcome = validate_one(reader.as_ref(), &model, &name, checker).await;
                drop(permit);
                if let AccountOutcome::Checked(found) = &outcome {
                    let is_balanced = !found.iter().any(|m| matches!(m, Mismatch::Balance { .. }));
                    if is_balanced {
                        let n = balanced.fetch_add(1, Ordering::Relaxed) + 1;
                        if interval > 0 && n % interval == 0 {
                            info!("validated {n} of {total} accounts");
                        }
                    }
                }
                outcome
            });
        }

        let mut report = ValidationReport {
            accounts_total: total,
            ..Default::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(AccountOutcome::Checked(found)) => {
                    report.accounts_checked += 1;
                    report.mismatches.extend(found);
                }
                Ok(AccountOutcome::QueryFailed(failure)) => report.query_failures.push(failure),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => warn!(error = %e, "validation task cancelled"),
            }
        }
        report.accounts_balanced = balanced.load(Ordering::Relaxed);
        report.sort();

        info!(
            checked = report.accounts_checked,
            balanced = report.accounts_balanced,
            failed_queries = report.query_failures.len(),
            mismatches = report.mismatches.len(),
            "validation complete"
        );
        report
    }
}

async fn validate_one<R: LedgerReader + ?Sized>(
    reader: &R,
    model: &AccountModel,
    name: &AccountName,
    checker: ReconciliationChecker,
) -> AccountOutcome {
    let live = match reader.get_account(name).await {
        Ok(live) => live,
        Err(e) => {
            warn!(account = %name, error = %e, "account query failed");
            return AccountOutcome::QueryFailed(QueryFailure {
                account: name.clone(),
                error: e.to_string(),
            });
        }
    };
    let Some(expected) = model.get(name.as_str()) else {
        return AccountOutcome::Checked(Vec::new());
    };
    let found = checker.check_account(expected, &live);
    for mismatch in &found {
        warn!(account = %name, "{mismatch}");
    }
    AccountOutcome::Checked(found)
}
