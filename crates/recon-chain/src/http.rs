use std::collections::HashMap;

use async_trait::async_trait;
use recon_crypto::{BatchDigest, SigningKey};
use recon_types::{AccountName, Asset, Operation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::endpoint::endpoints;
use crate::error::{ChainError, ChainResult};
use crate::records::{CurrencyStats, LiveAccount, PushReceipt};
use crate::traits::{LedgerReader, LedgerWriter};

/// JSON-over-HTTP client for a live ledger node.
///
/// No timeout is configured beyond the transport default, and no request is
/// retried.
pub struct HttpLedger {
    client: reqwest::Client,
    base_url: String,
    signer: Option<SigningKey>,
}

#[derive(Serialize)]
struct GetAccountRequest<'a> {
    account_name: &'a str,
}

#[derive(Serialize)]
struct CurrencyStatsRequest<'a> {
    code: &'a str,
    symbol: &'a str,
}

/// Body of a batch submission: the operations plus the operator's signature
/// over their digest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PushRequest {
    pub operations: Vec<Operation>,
    pub digest: String,
    pub signature: String,
    pub signer: String,
}

#[derive(Deserialize)]
struct PushResponse {
    transaction_id: String,
}

impl HttpLedger {
    pub fn new(endpoint: &str) -> ChainResult<Self> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ChainError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            signer: None,
        })
    }

    /// Attach the key used to sign submitted batches.
    pub fn with_signer(mut self, signer: SigningKey) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ChainResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChainError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ChainError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LedgerReader for HttpLedger {
    async fn get_account(&self, name: &AccountName) -> ChainResult<LiveAccount> {
        self.post(
            endpoints::GET_ACCOUNT,
            &GetAccountRequest {
                account_name: name.as_str(),
            },
        )
        .await
    }

    async fn get_supply(&self, contract: &str, symbol: &str) -> ChainResult<Asset> {
        let mut stats: HashMap<String, CurrencyStats> = self
            .post(
                endpoints::GET_CURRENCY_STATS,
                &CurrencyStatsRequest {
                    code: contract,
                    symbol,
                },
            )
            .await?;
        stats
            .remove(symbol)
            .map(|s| s.supply)
            .ok_or_else(|| ChainError::UnknownToken {
                contract: contract.to_string(),
                symbol: symbol.to_string(),
            })
    }
}

#[async_trait]
impl LedgerWriter for HttpLedger {
    async fn push_operations(&self, operations: &[Operation]) -> ChainResult<PushReceipt> {
        let signer = self.signer.as_ref().ok_or(ChainError::MissingSigner)?;
        let digest = BatchDigest::of_operations(operations)?;
        let request = PushRequest {
            operations: operations.to_vec(),
            digest: digest.to_hex(),
            signature: signer.sign_digest(&digest).to_hex(),
            signer: signer.verifying_key().to_hex(),
        };
        let response: PushResponse = self.post(endpoints::PUSH_OPERATIONS, &request).await?;
        debug!(
            transaction = %response.transaction_id,
            operations = operations.len(),
            "batch accepted"
        );
        Ok(PushReceipt {
            transaction_id: response.transaction_id,
            operation_count: operations.len(),
        })
    }
}
