use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use recon_chain::{HttpLedger, InMemoryLedger, LedgerReader, LedgerWriter};
use recon_crypto::SigningKey;
use recon_engine::{
    export_model, CsvSummary, InjectionReport, Injector, OperationBatcher, ValidationReport,
    Validator,
};
use recon_snapshot::SnapshotParser;
use recon_types::{AccountModel, AccountName, Amount, RunContext};
use tracing::{info, info_span, warn, Instrument};

use crate::config::RunConfig;

/// What one invocation did, for the closing summary.
#[derive(Debug)]
pub struct RunSummary {
    pub accounts: u64,
    pub total_balance: Amount,
    pub skipped_lines: u64,
    pub csv: Option<CsvSummary>,
    pub injection: Option<InjectionReport>,
    pub validation: Option<ValidationReport>,
}

impl RunSummary {
    fn new(ctx: &RunContext) -> Self {
        Self {
            accounts: ctx.account_count,
            total_balance: ctx.total_balance,
            skipped_lines: ctx.skipped_lines,
            csv: None,
            injection: None,
            validation: None,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![format!(
            "Parsed {} accounts, total balance {}",
            self.accounts.to_string().bold(),
            self.total_balance.to_string().bold()
        )];
        if self.skipped_lines > 0 {
            out.push(format!(
                "  {} {} lines without an account name",
                "skipped".yellow(),
                self.skipped_lines
            ));
        }
        if let Some(csv) = &self.csv {
            out.push(format!(
                "{} Report: {} rows ({} zero-balance accounts omitted)",
                "✓".green(),
                csv.rows,
                csv.skipped_zero
            ));
        }
        if let Some(injection) = &self.injection {
            out.push(format!(
                "{} Injected {} accounts: {} batches, {} operations",
                "✓".green(),
                injection.accounts,
                injection.batches,
                injection.operations
            ));
        }
        if let Some(report) = &self.validation {
            let mark = if report.is_clean() {
                "✓".green()
            } else {
                "✗".red()
            };
            out.push(format!(
                "{mark} Validated {} of {} accounts, {} balanced",
                report.accounts_checked, report.accounts_total, report.accounts_balanced
            ));
            if !report.query_failures.is_empty() {
                out.push(format!(
                    "  {} {}",
                    "query failures:".red(),
                    report.query_failures.len()
                ));
            }
            for (kind, count) in report.counts_by_kind() {
                out.push(format!("  {} {count}", format!("{kind:?}:").yellow()));
            }
            match (report.supply_checked, report.supply_mismatch()) {
                (false, _) => out.push(format!("  {}", "supply not checked".yellow())),
                (true, Some(mismatch)) => out.push(format!("  {}", mismatch.to_string().red())),
                (true, None) => out.push(format!("  {}", "supply matches".green())),
            }
        }
        out
    }

    pub fn print(&self) {
        for line in self.lines() {
            println!("{line}");
        }
    }
}

/// Parse the snapshot, then export, inject, and validate as configured.
pub async fn run(config: RunConfig) -> Result<RunSummary> {
    let ctx = RunContext::new();
    let span = info_span!("run", run_id = %ctx.run_id);
    execute(config, ctx).instrument(span).await
}

async fn execute(config: RunConfig, mut ctx: RunContext) -> Result<RunSummary> {
    let parser = SnapshotParser::new().with_debug_accounts(config.debug_accounts.iter().cloned());
    let model = parser
        .parse_file(&config.snapshot_input, &mut ctx)
        .with_context(|| format!("failed to load snapshot {}", config.snapshot_input.display()))?;
    let mut summary = RunSummary::new(&ctx);

    if config.write_csv {
        let csv = export_model(&model, &config.snapshot_output).with_context(|| {
            format!("failed to write report {}", config.snapshot_output.display())
        })?;
        summary.csv = Some(csv);
    }
    if !(config.inject || config.validate) {
        return Ok(summary);
    }

    if config.dry_run {
        info!("dry run against an in-memory ledger");
        let ledger = InMemoryLedger::new(&config.token_contract, &config.token_symbol);
        ledger.issue(&AccountName::from(config.creator.as_str()), ctx.total_balance);
        reconcile(&config, Arc::new(ledger), model, &mut ctx, &mut summary).await?;
    } else {
        let mut ledger = HttpLedger::new(&config.http_endpoint)?;
        if let Some(key) = &config.private_key {
            let key = SigningKey::from_hex(key.expose()).context("invalid private key")?;
            ledger = ledger.with_signer(key);
        }
        info!(endpoint = ledger.base_url(), "using remote ledger");
        reconcile(&config, Arc::new(ledger), model, &mut ctx, &mut summary).await?;
    }
    Ok(summary)
}

async fn reconcile<L>(
    config: &RunConfig,
    ledger: Arc<L>,
    model: AccountModel,
    ctx: &mut RunContext,
    summary: &mut RunSummary,
) -> Result<()>
where
    L: LedgerReader + LedgerWriter + 'static,
{
    if config.inject {
        let batcher = OperationBatcher::new(config.injection_params(), config.max_batch_size)?;
        let report = Injector::new(ledger.as_ref(), batcher)
            .run(&model)
            .await
            .context("injection aborted; the target ledger may hold a partial replay")?;
        summary.injection = Some(report);
    }

    if config.validate {
        match ledger
            .get_supply(&config.token_contract, &config.token_symbol)
            .await
        {
            Ok(supply) => ctx.set_contract_supply(supply.amount),
            Err(e) => warn!(error = %e, "supply query failed"),
        }
        let validator = Validator::new(Arc::clone(&ledger), config.validation_options())?;
        let mut report = validator.run(Arc::new(model)).await;
        if let Some(supply) = ctx.contract_supply {
            report.record_supply(ctx.total_balance, supply);
        }
        summary.validation = Some(report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use recon_engine::{EngineError, MismatchKind};

    use super::*;

    const SNAPSHOT: &str = "\
0,x,alice,EOS6alice,10.0000,2.5000,false,owner:EOS6alice;active:EOS6alice
1,x,bob,EOS6bob,0.0000,0.0000,false,owner:EOS6bob;active:EOS6bob
2,x,carol,EOS6carol,1.2345,,false,owner:EOS6carol;active:EOS6carol
3,x,,orphan,1.0000,1.0000,false,
";

    fn config_for(dir: &Path) -> RunConfig {
        let input = dir.join("snapshot.csv");
        std::fs::write(&input, SNAPSHOT).unwrap();
        RunConfig {
            snapshot_input: input,
            snapshot_output: dir.join("report.csv"),
            dry_run: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn export_only_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.write_csv = true;
        let summary = run(config).await.unwrap();
        assert_eq!(summary.accounts, 3);
        assert_eq!(summary.skipped_lines, 1);
        assert_eq!(summary.total_balance.to_string(), "16.2345");
        assert_eq!(
            summary.csv,
            Some(CsvSummary {
                rows: 2,
                skipped_zero: 1
            })
        );
        assert!(summary.injection.is_none() && summary.validation.is_none());
        let text = std::fs::read_to_string(dir.path().join("report.csv")).unwrap();
        assert_eq!(
            text,
            "alice,15.0000,2.5000,2.5000,10.0000\ncarol,1.2345,0.0000,0.0000,1.2345\n"
        );
    }

    #[tokio::test]
    async fn dry_run_injects_then_validates_clean() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.inject = true;
        config.validate = true;
        config.validate_stake = true;
        let summary = run(config).await.unwrap();
        assert_eq!(
            summary.injection,
            Some(InjectionReport {
                accounts: 3,
                batches: 1,
                operations: 12
            })
        );
        let report = summary.validation.unwrap();
        assert!(report.is_clean(), "{:?}", report.mismatches);
        assert_eq!(report.accounts_checked, 3);
        assert!(report.supply_checked);
    }

    #[tokio::test]
    async fn validate_without_injection_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.validate = true;
        let report = run(config).await.unwrap().validation.unwrap();
        assert_eq!(report.query_failures.len(), 3);
        assert_eq!(report.accounts_checked, 0);
        assert!(report.supply_mismatch().is_none());
    }

    #[tokio::test]
    async fn rejected_batch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.inject = true;
        config.validate = true;
        config.max_batch_size = 4;
        let mut ctx = RunContext::new();
        let model = SnapshotParser::new()
            .parse_file(&config.snapshot_input, &mut ctx)
            .unwrap();
        let ledger = Arc::new(InMemoryLedger::default());
        ledger.issue(&"eosio".into(), ctx.total_balance);
        ledger.fail_submission_at(1);
        let mut summary = RunSummary::new(&ctx);

        let err = reconcile(&config, Arc::clone(&ledger), model, &mut ctx, &mut summary)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Injection { batch: 1, .. })
        ));
        assert_eq!(ledger.submission_count(), 2);
        assert!(summary.validation.is_none());
    }

    #[tokio::test]
    async fn supply_drift_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.inject = true;
        config.validate = true;
        let mut ctx = RunContext::new();
        let model = SnapshotParser::new()
            .parse_file(&config.snapshot_input, &mut ctx)
            .unwrap();
        let ledger = Arc::new(InMemoryLedger::default());
        ledger.issue(&"eosio".into(), ctx.total_balance + Amount::from_units(1));
        let mut summary = RunSummary::new(&ctx);

        reconcile(&config, ledger, model, &mut ctx, &mut summary)
            .await
            .unwrap();
        let report = summary.validation.unwrap();
        assert_eq!(report.counts_by_kind()[&MismatchKind::Supply], 1);
        assert_eq!(ctx.contract_supply, Some(ctx.total_balance + Amount::from_units(1)));
    }

    #[tokio::test]
    async fn missing_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            snapshot_input: dir.path().join("absent.csv"),
            write_csv: true,
            ..Default::default()
        };
        let err = run(config).await.unwrap_err();
        assert!(err.to_string().contains("failed to load snapshot"));
    }

    #[test]
    fn summary_lists_each_stage() {
        colored::control::set_override(false);
        let summary = RunSummary {
            accounts: 2,
            total_balance: Amount::from_units(30_000),
            skipped_lines: 0,
            csv: None,
            injection: Some(InjectionReport {
                accounts: 2,
                batches: 1,
                operations: 8,
            }),
            validation: Some(ValidationReport {
                accounts_total: 2,
                accounts_checked: 2,
                accounts_balanced: 2,
                supply_checked: true,
                ..Default::default()
            }),
        };
        assert_eq!(
            summary.lines(),
            [
                "Parsed 2 accounts, total balance 3.0000",
                "✓ Injected 2 accounts: 1 batches, 8 operations",
                "✓ Validated 2 of 2 accounts, 2 balanced",
                "  supply matches",
            ]
        );
    }
}
