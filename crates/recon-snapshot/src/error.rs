use std::io;
use std::path::PathBuf;

/// Errors produced while reading a snapshot.
///
/// Field-level anomalies are not errors; only the input source failing is.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("cannot open snapshot {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("read error at line {line}: {source}")]
    Read { line: u64, source: io::Error },
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
