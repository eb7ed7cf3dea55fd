use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_client::rpc_config::{RpcSignaturesForAddressConfig, RpcTransactionConfig};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_transaction_status::UiTransactionEncoding;

use crate::config::AppConfig;
use crate::core::error::{ConfigError, UpstreamError};
use crate::types::{SignatureInfo, TransactionRecord};

const GET_TRANSACTION: &str = "getTransaction";
const GET_SIGNATURES_FOR_ADDRESS: &str = "getSignaturesForAddress";

/// Read access to the ledger. Implemented over JSON-RPC by [`RpcLedger`].
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Up to `limit` signatures for `address`, newest first, strictly older
    /// than `before` when given. An empty page means history is exhausted.
    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureInfo>, UpstreamError>;

    /// Full `jsonParsed` record, or `None` when the node does not know it.
    async fn transaction(&self, signature: &str)
        -> Result<Option<TransactionRecord>, UpstreamError>;
}

#[async_trait]
impl<T: LedgerSource + ?Sized> LedgerSource for Arc<T> {
    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureInfo>, UpstreamError> {
        (**self).signatures_for_address(address, limit, before).await
    }

    async fn transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, UpstreamError> {
        (**self).transaction(signature).await
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// JSON-RPC client for a Solana node.
#[derive(Debug)]
pub struct RpcLedger {
    client: Client,
    url: String,
    commitment: CommitmentConfig,
    next_id: AtomicU64,
}

impl RpcLedger {
    pub fn new(client: Client, url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client,
            url: url.into(),
            commitment,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| ConfigError::Invalid(format!("failed to build http client: {err}")))?;
        Ok(Self::new(client, config.rpc_url.clone(), config.commitment_config()?))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<Option<T>, UpstreamError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|err| UpstreamError::transport(method, err.to_string()))?;

        let status = response.status();
        let bytes = response.bytes().await;

        // Nodes send the JSON-RPC error body alongside 429/5xx statuses.
        if !status.is_success() {
            let error = bytes
                .ok()
                .and_then(|bytes| serde_json::from_slice::<JsonRpcResponse<Value>>(&bytes).ok())
                .and_then(|decoded| decoded.error);
            return Err(match error {
                Some(err) => UpstreamError::Rpc {
                    method,
                    code: err.code,
                    message: err.message,
                },
                None => UpstreamError::Status {
                    method,
                    status: status.as_u16(),
                },
            });
        }

        let bytes = bytes.map_err(|err| UpstreamError::transport(method, err.to_string()))?;
        let decoded: JsonRpcResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|err| UpstreamError::decode(method, err.to_string()))?;

        if let Some(err) = decoded.error {
            return Err(UpstreamError::Rpc {
                method,
                code: err.code,
                message: err.message,
            });
        }
        Ok(decoded.result)
    }
}

fn to_param<T: serde::Serialize>(method: &'static str, value: T) -> Result<Value, UpstreamError> {
    serde_json::to_value(value).map_err(|err| UpstreamError::decode(method, err.to_string()))
}

#[async_trait]
impl LedgerSource for RpcLedger {
    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureInfo>, UpstreamError> {
        let config = RpcSignaturesForAddressConfig {
            before: before.map(str::to_string),
            limit: Some(limit),
            commitment: Some(self.commitment),
            ..Default::default()
        };
        let params = json!([address, to_param(GET_SIGNATURES_FOR_ADDRESS, config)?]);
        tracing::debug!(address, limit, before, "requesting signature page");

        self.call::<Vec<SignatureInfo>>(GET_SIGNATURES_FOR_ADDRESS, params)
            .await?
            .ok_or_else(|| UpstreamError::decode(GET_SIGNATURES_FOR_ADDRESS, "missing result"))
    }

    async fn transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, UpstreamError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };
        let params = json!([signature, to_param(GET_TRANSACTION, config)?]);
        tracing::debug!(signature, "requesting transaction");

        self.call::<TransactionRecord>(GET_TRANSACTION, params).await
    }
}
