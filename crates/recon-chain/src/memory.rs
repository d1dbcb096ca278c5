use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use recon_types::{AccountName, Amount, Asset, Authority, Operation};
use tracing::debug;

use crate::error::{ChainError, ChainResult};
use crate::records::{LiveAccount, LivePermission, PushReceipt, RequiredAuth, ResourceStake};
use crate::traits::{LedgerReader, LedgerWriter};

/// Simulated ledger for tests, dry runs, and embedding.
///
/// Applies the four injection operations to in-memory account state. Each
/// batch is atomic: if any operation fails, none of the batch is applied.
/// Failures can be injected for submissions and for individual account
/// queries.
pub struct InMemoryLedger {
    token_contract: String,
    token_symbol: String,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    accounts: BTreeMap<AccountName, LiveAccount>,
    supply: Amount,
    submissions: usize,
    accepted: Vec<Vec<Operation>>,
    fail_submission_at: Option<usize>,
    failing_queries: HashSet<String>,
}

impl InMemoryLedger {
    pub fn new(token_contract: impl Into<String>, token_symbol: impl Into<String>) -> Self {
        Self {
            token_contract: token_contract.into(),
            token_symbol: token_symbol.into(),
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Issue `amount` new tokens into `to`, creating the account if needed.
    pub fn issue(&self, to: &AccountName, amount: Amount) {
        let mut state = self.inner.write().expect("ledger lock poisoned");
        state.supply += amount;
        let symbol = self.token_symbol.clone();
        let account = state
            .accounts
            .entry(to.clone())
            .or_insert_with(|| LiveAccount::new(to.clone()));
        credit_liquid(account, amount, &symbol);
    }

    /// Seed or overwrite an account's full live state.
    pub fn insert_account(&self, account: LiveAccount) {
        let mut state = self.inner.write().expect("ledger lock poisoned");
        state
            .accounts
            .insert(account.account_name.clone(), account);
    }

    /// Reject the `index`-th submission (zero-based) and every one after it.
    pub fn fail_submission_at(&self, index: usize) {
        self.inner.write().expect("ledger lock poisoned").fail_submission_at = Some(index);
    }

    /// Make queries for `name` fail with a remote error.
    pub fn fail_queries_for(&self, name: &str) {
        self.inner
            .write()
            .expect("ledger lock poisoned")
            .failing_queries
            .insert(name.to_string());
    }

    /// Batches accepted so far, in submission order.
    pub fn accepted_batches(&self) -> Vec<Vec<Operation>> {
        self.inner.read().expect("ledger lock poisoned").accepted.clone()
    }

    /// Number of submission attempts, accepted or not.
    pub fn submission_count(&self) -> usize {
        self.inner.read().expect("ledger lock poisoned").submissions
    }

    pub fn account(&self, name: &str) -> Option<LiveAccount> {
        self.inner
            .read()
            .expect("ledger lock poisoned")
            .accounts
            .get(name)
            .cloned()
    }

    pub fn supply(&self) -> Amount {
        self.inner.read().expect("ledger lock poisoned").supply
    }

    fn apply(&self, accounts: &mut Staging<'_>, op: &Operation) -> ChainResult<()> {
        match op {
            Operation::NewAccount {
                creator,
                name,
                owner,
                active,
            } => {
                require(accounts, creator)?;
                if accounts.contains(name) {
                    return Err(ChainError::Rejected(format!("account {name} already exists")));
                }
                let mut account = LiveAccount::new(name.clone());
                account.permissions = vec![
                    live_permission("owner", "", owner),
                    live_permission("active", "owner", active),
                ];
                accounts.insert(account);
            }
            Operation::BuyRamBytes {
                payer,
                receiver,
                bytes,
            } => {
                require(accounts, payer)?;
                require(accounts, receiver)?.ram_quota += u64::from(*bytes);
            }
            Operation::DelegateBandwidth {
                from,
                receiver,
                stake_net_quantity,
                stake_cpu_quantity,
                ..
            } => {
                self.check_symbol(stake_net_quantity)?;
                self.check_symbol(stake_cpu_quantity)?;
                let total = stake_net_quantity.amount + stake_cpu_quantity.amount;
                debit_liquid(require(accounts, from)?, total)?;
                let symbol = &self.token_symbol;
                let target = require(accounts, receiver)?;
                let stake = target.self_delegated_bandwidth.get_or_insert_with(|| ResourceStake {
                    cpu_weight: Asset::new(Amount::ZERO, symbol.clone()),
                    net_weight: Asset::new(Amount::ZERO, symbol.clone()),
                });
                stake.cpu_weight.amount += stake_cpu_quantity.amount;
                stake.net_weight.amount += stake_net_quantity.amount;
            }
            Operation::Transfer {
                from, to, quantity, ..
            } => {
                self.check_symbol(quantity)?;
                require(accounts, to)?;
                debit_liquid(require(accounts, from)?, quantity.amount)?;
                credit_liquid(require(accounts, to)?, quantity.amount, &self.token_symbol);
            }
        }
        Ok(())
    }

    fn check_symbol(&self, asset: &Asset) -> ChainResult<()> {
        if asset.symbol != self.token_symbol {
            return Err(ChainError::Rejected(format!(
                "symbol mismatch: expected {}, got {}",
                self.token_symbol, asset.symbol
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new("eosio.token", "EOS")
    }
}

/// Copy-on-write view of the account map for one batch. Only accounts the
/// batch touches are copied; the copies replace the originals on success.
struct Staging<'a> {
    base: &'a BTreeMap<AccountName, LiveAccount>,
    touched: BTreeMap<AccountName, LiveAccount>,
}

impl<'a> Staging<'a> {
    fn new(base: &'a BTreeMap<AccountName, LiveAccount>) -> Self {
        Self {
            base,
            touched: BTreeMap::new(),
        }
    }

    fn contains(&self, name: &AccountName) -> bool {
        self.touched.contains_key(name) || self.base.contains_key(name)
    }

    fn insert(&mut self, account: LiveAccount) {
        self.touched.insert(account.account_name.clone(), account);
    }

    fn get_mut(&mut self, name: &AccountName) -> Option<&mut LiveAccount> {
        if !self.touched.contains_key(name) {
            let account = self.base.get(name)?.clone();
            self.touched.insert(name.clone(), account);
        }
        self.touched.get_mut(name)
    }

    fn into_touched(self) -> BTreeMap<AccountName, LiveAccount> {
        self.touched
    }
}

fn require<'a>(
    accounts: &'a mut Staging<'_>,
    name: &AccountName,
) -> ChainResult<&'a mut LiveAccount> {
    accounts
        .get_mut(name)
        .ok_or_else(|| ChainError::Rejected(format!("unknown account {name}")))
}

fn credit_liquid(account: &mut LiveAccount, amount: Amount, symbol: &str) {
    let balance = account
        .core_liquid_balance
        .get_or_insert_with(|| Asset::new(Amount::ZERO, symbol));
    balance.amount += amount;
}

fn debit_liquid(account: &mut LiveAccount, amount: Amount) -> ChainResult<()> {
    let available = account.liquid();
    if available < amount {
        return Err(ChainError::Rejected(format!(
            "overdrawn balance on {}: has {available}, needs {amount}",
            account.account_name
        )));
    }
    if let Some(balance) = account.core_liquid_balance.as_mut() {
        balance.amount = available - amount;
    }
    Ok(())
}

fn live_permission(name: &str, parent: &str, authority: &Authority) -> LivePermission {
    LivePermission {
        perm_name: name.to_string(),
        parent: parent.to_string(),
        required_auth: RequiredAuth {
            threshold: authority.threshold,
            keys: authority.keys.clone(),
            accounts: Vec::new(),
        },
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn get_account(&self, name: &AccountName) -> ChainResult<LiveAccount> {
        let state = self.inner.read().expect("ledger lock poisoned");
        if state.failing_queries.contains(name.as_str()) {
            return Err(ChainError::Remote {
                status: 500,
                message: format!("simulated query failure for {name}"),
            });
        }
        state
            .accounts
            .get(name)
            .cloned()
            .ok_or_else(|| ChainError::AccountNotFound(name.to_string()))
    }

    async fn get_supply(&self, contract: &str, symbol: &str) -> ChainResult<Asset> {
        if contract != self.token_contract || symbol != self.token_symbol {
            return Err(ChainError::UnknownToken {
                contract: contract.to_string(),
                symbol: symbol.to_string(),
            });
        }
        let supply = self.inner.read().expect("ledger lock poisoned").supply;
        Ok(Asset::new(supply, symbol))
    }
}

#[async_trait]
impl LedgerWriter for InMemoryLedger {
    async fn push_operations(&self, operations: &[Operation]) -> ChainResult<PushReceipt> {
        let mut state = self.inner.write().expect("ledger lock poisoned");
        let index = state.submissions;
        state.submissions += 1;
        if state.fail_submission_at.is_some_and(|at| index >= at) {
            return Err(ChainError::Rejected(format!("simulated failure of batch {index}")));
        }

        let mut staging = Staging::new(&state.accounts);
        for op in operations {
            self.apply(&mut staging, op)?;
        }
        let touched = staging.into_touched();
        state.accounts.extend(touched);
        state.accepted.push(operations.to_vec());
        debug!(batch = index, operations = operations.len(), "batch applied");

        Ok(PushReceipt {
            transaction_id: format!("mem-{index:08}"),
            operation_count: operations.len(),
        })
    }
}
