use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use recon_engine::{
    InjectionParams, ValidationOptions, DEFAULT_MAX_BATCH_SIZE, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_VALIDATE_CONCURRENCY,
};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Operator key material as given in the config file or on the command line.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl From<String> for PrivateKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Everything one invocation needs.
///
/// Missing keys in the TOML file take their default; command-line flags are
/// applied on top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub inject: bool,
    pub validate: bool,
    pub validate_stake: bool,
    pub write_csv: bool,
    pub debug_accounts: Vec<String>,
    pub debug: bool,
    pub dry_run: bool,
    pub snapshot_input: PathBuf,
    pub snapshot_output: PathBuf,
    pub http_endpoint: String,
    pub private_key: Option<PrivateKey>,
    pub max_batch_size: usize,
    pub validate_concurrency: usize,
    pub creator: String,
    pub token_contract: String,
    pub token_symbol: String,
    pub ram_bytes: u32,
    pub transfer_memo: String,
    pub progress_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        let params = InjectionParams::default();
        Self {
            inject: false,
            validate: false,
            validate_stake: false,
            write_csv: false,
            debug_accounts: Vec::new(),
            debug: false,
            dry_run: false,
            snapshot_input: PathBuf::from("snapshot.csv"),
            snapshot_output: PathBuf::from("snapshot-report.csv"),
            http_endpoint: "http://127.0.0.1:8888".into(),
            private_key: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            validate_concurrency: DEFAULT_VALIDATE_CONCURRENCY,
            creator: params.creator.to_string(),
            token_contract: "eosio.token".into(),
            token_symbol: params.token_symbol,
            ram_bytes: params.ram_bytes,
            transfer_memo: params.memo,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Config file (if any) with command-line overrides, validated.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(cli);
        config.validate()?;
        Ok(config)
    }

    /// Flags only ever switch modes on; valued flags replace file values.
    pub fn apply(&mut self, cli: &Cli) {
        self.inject |= cli.inject;
        self.validate |= cli.validate;
        self.validate_stake |= cli.validate_stake;
        self.write_csv |= cli.write_csv;
        self.debug |= cli.debug;
        self.dry_run |= cli.dry_run;
        self.debug_accounts.extend(cli.debug_accounts.iter().cloned());
        if let Some(input) = &cli.input {
            self.snapshot_input = input.clone();
        }
        if let Some(output) = &cli.output {
            self.snapshot_output = output.clone();
        }
        if let Some(endpoint) = &cli.endpoint {
            self.http_endpoint = endpoint.clone();
        }
        if let Some(key) = &cli.private_key {
            self.private_key = Some(key.clone().into());
        }
        if let Some(n) = cli.max_batch_size {
            self.max_batch_size = n;
        }
        if let Some(n) = cli.concurrency {
            self.validate_concurrency = n;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.inject || self.validate || self.write_csv) {
            bail!("nothing to do: enable at least one of inject, validate, write_csv");
        }
        if self.inject && !self.dry_run && self.private_key.is_none() {
            bail!("injection requires a private key");
        }
        if self.validate_stake && !self.validate {
            bail!("validate_stake requires validate");
        }
        Ok(())
    }

    pub fn injection_params(&self) -> InjectionParams {
        InjectionParams {
            creator: self.creator.as_str().into(),
            token_symbol: self.token_symbol.clone(),
            ram_bytes: self.ram_bytes,
            memo: self.transfer_memo.clone(),
        }
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            concurrency: self.validate_concurrency,
            validate_stake: self.validate_stake,
            progress_interval: self.progress_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("recon").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_reference_run() {
        let config = RunConfig::default();
        assert_eq!(config.max_batch_size, 600);
        assert_eq!(config.validate_concurrency, 8);
        assert_eq!(config.creator, "eosio");
        assert_eq!(config.token_contract, "eosio.token");
        assert_eq!(config.token_symbol, "EOS");
        assert_eq!(config.ram_bytes, 8192);
        assert_eq!(config.progress_interval, 1000);
        assert_eq!(config.snapshot_input, PathBuf::from("snapshot.csv"));
        assert_eq!(config.http_endpoint, "http://127.0.0.1:8888");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recon.toml");
        std::fs::write(
            &path,
            r#"
validate = true
snapshot_input = "genesis.csv"
debug_accounts = ["alice"]
validate_concurrency = 4
"#,
        )
        .unwrap();
        let config = RunConfig::load(&path).unwrap();
        assert!(config.validate);
        assert!(!config.inject);
        assert_eq!(config.snapshot_input, PathBuf::from("genesis.csv"));
        assert_eq!(config.debug_accounts, ["alice"]);
        assert_eq!(config.validate_concurrency, 4);
        assert_eq!(config.max_batch_size, 600);
    }

    #[test]
    fn unreadable_and_malformed_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RunConfig::load(&dir.path().join("missing.toml")).is_err());
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "max_batch_size = \"lots\"").unwrap();
        assert!(RunConfig::load(&path).is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recon.toml");
        std::fs::write(
            &path,
            "write_csv = true\nhttp_endpoint = \"http://file:8888\"\nmax_batch_size = 100\n",
        )
        .unwrap();
        let config = RunConfig::resolve(&cli(&[
            "-c",
            path.to_str().unwrap(),
            "--validate",
            "--endpoint",
            "http://flag:8888",
        ]))
        .unwrap();
        assert!(config.write_csv && config.validate);
        assert_eq!(config.http_endpoint, "http://flag:8888");
        assert_eq!(config.max_batch_size, 100);
    }

    #[test]
    fn requires_a_mode() {
        let err = RunConfig::resolve(&cli(&[])).unwrap_err();
        assert!(err.to_string().contains("nothing to do"));
    }

    #[test]
    fn injection_requires_key_unless_dry_run() {
        assert!(RunConfig::resolve(&cli(&["--inject"])).is_err());
        assert!(RunConfig::resolve(&cli(&["--inject", "--dry-run"])).is_ok());
        let config = RunConfig::resolve(&cli(&["--inject", "--private-key", "00ff"])).unwrap();
        assert_eq!(config.private_key.unwrap().expose(), "00ff");
    }

    #[test]
    fn private_key_is_redacted_in_debug() {
        let mut config = RunConfig::default();
        config.private_key = Some("deadbeef".to_string().into());
        assert!(!format!("{config:?}").contains("deadbeef"));
    }

    #[test]
    fn engine_settings_follow_config() {
        let mut config = RunConfig::default();
        config.creator = "genesis".into();
        config.transfer_memo = "hello".into();
        config.validate_stake = true;
        config.validate_concurrency = 3;
        let params = config.injection_params();
        assert_eq!(params.creator.as_str(), "genesis");
        assert_eq!(params.memo, "hello");
        let options = config.validation_options();
        assert!(options.validate_stake);
        assert_eq!(options.concurrency, 3);
    }
}
