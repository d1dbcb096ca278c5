use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use recon_types::{AccountModel, AccountName, AccountRecord, Amount, PermissionSet, RunContext};
use tracing::{debug, info};

use crate::error::{SnapshotError, SnapshotResult};

const DELIMITER: char = ',';

const FIELD_NAME: usize = 2;
const FIELD_PUB_KEY: usize = 3;
const FIELD_LIQUID: usize = 4;
const FIELD_STAKED: usize = 5;
const FIELD_PRIVILEGED: usize = 6;
const FIELD_PERMISSIONS: usize = 7;

/// Converts snapshot lines into [`AccountRecord`]s.
#[derive(Clone, Debug, Default)]
pub struct SnapshotParser {
    debug_accounts: HashSet<String>,
}

impl SnapshotParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts whose parsed record is traced in full.
    pub fn with_debug_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.debug_accounts = accounts.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a single line. Returns `None` when the line names no account.
    ///
    /// Missing or malformed numeric fields become zero. The permission blob
    /// may itself contain commas, so everything from its column onward is
    /// taken as one field.
    pub fn parse_line(&self, line: &str) -> Option<AccountRecord> {
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<&str> = line.splitn(FIELD_PERMISSIONS + 1, DELIMITER).collect();
        let field = |i: usize| fields.get(i).map(|f| f.trim()).unwrap_or("");

        let name = field(FIELD_NAME);
        if name.is_empty() {
            return None;
        }

        Some(AccountRecord::new(
            AccountName::new(name),
            field(FIELD_PUB_KEY),
            Amount::parse_or_zero(field(FIELD_LIQUID)),
            Amount::parse_or_zero(field(FIELD_STAKED)),
            field(FIELD_PRIVILEGED) == "true",
            PermissionSet::parse_blob(field(FIELD_PERMISSIONS)),
        ))
    }

    /// Parse every line of `reader` into a model, updating `ctx` per record.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than failing the
    /// file; only I/O errors abort.
    pub fn parse_reader<R: BufRead>(
        &self,
        mut reader: R,
        ctx: &mut RunContext,
    ) -> SnapshotResult<AccountModel> {
        let mut model = AccountModel::new();
        let mut buf = Vec::new();
        let mut line_no = 0u64;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| SnapshotError::Read {
                    line: line_no + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;
            let line = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = line {
                debug!(line = line_no, "invalid UTF-8 replaced in snapshot line");
            }
            if line.trim().is_empty() {
                continue;
            }
            let Some(record) = self.parse_line(&line) else {
                debug!(line = line_no, "snapshot line without account name skipped");
                ctx.record_skipped_line();
                continue;
            };
            if self.debug_accounts.contains(record.name.as_str()) {
                info!(line = line_no, record = ?record, "traced account parsed");
            }
            ctx.record_account(&record);
            if let Some(previous) = model.insert(record) {
                debug!(account = %previous.name, line = line_no, "duplicate account replaced");
            }
        }
        info!(
            accounts = ctx.account_count,
            unique = model.len(),
            total_balance = %ctx.total_balance,
            "snapshot parsed"
        );
        Ok(model)
    }

    pub fn parse_file(&self, path: &Path, ctx: &mut RunContext) -> SnapshotResult<AccountModel> {
        let file = File::open(path).map_err(|source| SnapshotError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_reader(BufReader::new(file), ctx)
    }
}
