use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use recon_types::{AccountModel, AccountRecord};
use tracing::info;

use crate::error::EngineResult;

/// One report line: `name,balance,cpu_stake,net_stake,liquid`, or `None` for
/// an account whose balance is exactly zero.
pub fn format_row(record: &AccountRecord) -> Option<String> {
    if record.balance.is_zero() {
        return None;
    }
    Some(format!(
        "{},{},{},{},{}",
        record.name, record.balance, record.cpu_stake, record.net_stake, record.liquid
    ))
}

/// Counts from one export pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CsvSummary {
    pub rows: usize,
    pub skipped_zero: usize,
}

/// Writes the account model as CSV. The target file is truncated when the
/// sink is created.
pub struct CsvReportSink<W: Write> {
    writer: W,
    summary: CsvSummary,
}

impl CsvReportSink<BufWriter<File>> {
    pub fn create(path: &Path) -> EngineResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> CsvReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            summary: CsvSummary::default(),
        }
    }

    pub fn write_record(&mut self, record: &AccountRecord) -> EngineResult<()> {
        match format_row(record) {
            Some(row) => {
                writeln!(self.writer, "{row}")?;
                self.summary.rows += 1;
            }
            None => self.summary.skipped_zero += 1,
        }
        Ok(())
    }

    pub fn write_model(&mut self, model: &AccountModel) -> EngineResult<()> {
        for record in model.records() {
            self.write_record(record)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> EngineResult<CsvSummary> {
        self.writer.flush()?;
        Ok(self.summary)
    }
}

/// Export `model` to `path`, replacing any previous report.
pub fn export_model(model: &AccountModel, path: &Path) -> EngineResult<CsvSummary> {
    let mut sink = CsvReportSink::create(path)?;
    sink.write_model(model)?;
    let summary = sink.finish()?;
    info!(
        path = %path.display(),
        rows = summary.rows,
        skipped = summary.skipped_zero,
        "report written"
    );
    Ok(summary)
}
