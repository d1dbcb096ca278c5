//! Reconciliation and batched dispatch engine for recon.
//!
//! - [`OperationBatcher`] expands accounts into bounded operation batches
//! - [`Injector`] submits those batches one at a time; the first failure is fatal
//! - [`Validator`] compares live state for every account on a bounded pool
//! - [`ReconciliationChecker`] holds the per-account comparison rules
//! - [`export_model`] writes the CSV report

pub mod batcher;
pub mod checker;
pub mod csv;
pub mod error;
pub mod inject;
pub mod report;
pub mod validate;

pub use batcher::{InjectionParams, OperationBatcher, DEFAULT_MAX_BATCH_SIZE, OPERATIONS_PER_ACCOUNT};
pub use checker::{check_supply, ReconciliationChecker};
pub use csv::{export_model, CsvReportSink, CsvSummary};
pub use error::{EngineError, EngineResult};
pub use inject::Injector;
pub use report::{InjectionReport, Mismatch, MismatchKind, QueryFailure, ValidationReport};
pub use validate::{
    ValidationOptions, Validator, DEFAULT_PROGRESS_INTERVAL, DEFAULT_VALIDATE_CONCURRENCY,
};
