use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "recon",
    about = "Replay a genesis snapshot onto a ledger and reconcile the result",
    version
)]
pub struct Cli {
    /// TOML run configuration; flags below override its values
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Replay every snapshot account onto the ledger (run once per target)
    #[arg(long)]
    pub inject: bool,

    /// Compare every snapshot account against live ledger state
    #[arg(long)]
    pub validate: bool,

    /// Also compare CPU and NET stake during validation
    #[arg(long)]
    pub validate_stake: bool,

    /// Write the parsed account model as a CSV report
    #[arg(long)]
    pub write_csv: bool,

    /// Trace this account's parsed record (repeatable)
    #[arg(long = "debug-account", value_name = "ACCOUNT")]
    pub debug_accounts: Vec<String>,

    /// Verbose operational logging
    #[arg(short, long)]
    pub debug: bool,

    /// Run against a simulated in-memory ledger instead of the endpoint
    #[arg(long)]
    pub dry_run: bool,

    /// Snapshot file to read
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// CSV report to write
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Ledger node base URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Hex-encoded operator signing key, required for injection
    #[arg(long, value_name = "HEX")]
    pub private_key: Option<String>,

    /// Upper bound on operations per submitted batch
    #[arg(long, value_name = "N")]
    pub max_batch_size: Option<usize>,

    /// Ceiling on concurrent validation queries
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}
