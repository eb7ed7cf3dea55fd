pub mod cancel;
pub mod retry;

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use crate::config::HistoryConfig;
use crate::core::constants::SECONDS_PER_DAY;
use crate::core::error::HistoryError;
use crate::rpc::LedgerSource;
use crate::types::{SignatureInfo, TransactionRecord};

pub use cancel::{CancelHandle, Cancellation, Cancelled};
pub use retry::RetryPolicy;

/// Inclusive lower bound on `blockTime`, in unix seconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub cutoff: i64,
}

impl TimeWindow {
    pub fn since(cutoff: i64) -> Self {
        Self { cutoff }
    }

    /// Window covering the last `days` days from the current wall clock.
    pub fn trailing_days(days: u32) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or(0);
        Self::since(now - i64::from(days) * SECONDS_PER_DAY)
    }

    /// Entries without a block time are never inside the window.
    pub fn contains(&self, block_time: Option<i64>) -> bool {
        block_time.map_or(false, |time| time >= self.cutoff)
    }
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// Upstream returned an empty page.
    Exhausted,
    /// Oldest entry of the last page predates the cutoff.
    ReachedCutoff,
    /// Upstream returned the cursor itself as the oldest entry again.
    StalledCursor,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureHistory {
    pub signatures: Vec<SignatureInfo>,
    pub pages: usize,
    pub stop: StopReason,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FetchedTransaction {
    pub signature: String,
    pub record: TransactionRecord,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FetchFailure {
    pub signature: String,
    pub attempts: u32,
    pub error: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistory {
    pub transactions: Vec<FetchedTransaction>,
    pub failures: Vec<FetchFailure>,
    /// Signatures the node reported but could not return a record for.
    pub missing: Vec<String>,
    pub pages: usize,
    pub stop: StopReason,
}

/// Walks a wallet's signature list backward in time and optionally fetches
/// each full record. Every upstream call is issued sequentially.
#[derive(Debug)]
pub struct HistoryFetcher<S> {
    source: S,
    config: HistoryConfig,
    retry: RetryPolicy,
}

impl<S: LedgerSource> HistoryFetcher<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, HistoryConfig::default())
    }

    pub fn with_config(source: S, config: HistoryConfig) -> Self {
        let retry = RetryPolicy::from(&config.retry);
        Self {
            source,
            config,
            retry,
        }
    }

    /// Signatures of `wallet` inside `window`, newest first. A failed page
    /// request aborts the walk; cancellation returns what was gathered.
    pub async fn signatures(
        &self,
        wallet: &str,
        window: TimeWindow,
        cancel: &Cancellation,
    ) -> Result<SignatureHistory, HistoryError> {
        validate_wallet(wallet)?;

        let mut kept = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        let stop = loop {
            let request =
                self.source
                    .signatures_for_address(wallet, self.config.page_size, cursor.as_deref());
            let page = match cancel.run(request).await {
                Ok(page) => page?,
                Err(Cancelled) => break StopReason::Cancelled,
            };
            pages += 1;

            let Some(oldest) = page.last() else {
                break StopReason::Exhausted;
            };
            if cursor.as_deref() == Some(oldest.signature.as_str()) {
                warn!(wallet, cursor = ?cursor, "cursor did not advance, stopping");
                break StopReason::StalledCursor;
            }
            let oldest_time = oldest.block_time.unwrap_or(0);
            let oldest_signature = oldest.signature.clone();

            let page_len = page.len();
            let before = kept.len();
            kept.extend(page.into_iter().filter(|info| window.contains(info.block_time)));
            debug!(
                wallet,
                page = pages,
                received = page_len,
                kept = kept.len() - before,
                oldest_time,
                "signature page"
            );

            if oldest_time < window.cutoff {
                break StopReason::ReachedCutoff;
            }
            cursor = Some(oldest_signature);
        };

        info!(wallet, signatures = kept.len(), pages, stop = ?stop, "signature walk finished");
        Ok(SignatureHistory {
            signatures: kept,
            pages,
            stop,
        })
    }

    /// One full record under the retry policy. `Ok(None)` means the node has
    /// no such transaction and is not retried.
    pub async fn transaction_with_retry(
        &self,
        signature: &str,
        cancel: &Cancellation,
    ) -> Result<Option<TransactionRecord>, HistoryError> {
        self.retry
            .run(signature, cancel, || self.source.transaction(signature))
            .await
    }

    /// Signatures as in [`HistoryFetcher::signatures`], then each full record
    /// in order. Exhausted retries and missing records are recorded and
    /// skipped.
    pub async fn transactions(
        &self,
        wallet: &str,
        window: TimeWindow,
        cancel: &Cancellation,
    ) -> Result<TransactionHistory, HistoryError> {
        let walk = self.signatures(wallet, window, cancel).await?;
        let mut history = TransactionHistory {
            transactions: Vec::with_capacity(walk.signatures.len()),
            failures: Vec::new(),
            missing: Vec::new(),
            pages: walk.pages,
            stop: walk.stop,
        };
        if walk.stop == StopReason::Cancelled {
            return Ok(history);
        }

        let delay = self.config.request_delay();
        for (position, info) in walk.signatures.iter().enumerate() {
            if position > 0 && cancel.sleep(delay).await.is_err() {
                history.stop = StopReason::Cancelled;
                break;
            }

            match self.transaction_with_retry(&info.signature, cancel).await {
                Ok(Some(record)) => history.transactions.push(FetchedTransaction {
                    signature: info.signature.clone(),
                    record,
                }),
                Ok(None) => {
                    warn!(signature = %info.signature, "transaction not found, skipping");
                    history.missing.push(info.signature.clone());
                }
                Err(HistoryError::ExhaustedRetries {
                    signature,
                    attempts,
                    last,
                }) => {
                    warn!(signature = %signature, attempts, "skipping transaction");
                    history.failures.push(FetchFailure {
                        signature,
                        attempts,
                        error: last.to_string(),
                    });
                }
                Err(HistoryError::Cancelled) => {
                    history.stop = StopReason::Cancelled;
                    break;
                }
                Err(other) => return Err(other),
            }
        }

        info!(
            wallet,
            fetched = history.transactions.len(),
            failed = history.failures.len(),
            missing = history.missing.len(),
            stop = ?history.stop,
            "transaction fetch finished"
        );
        Ok(history)
    }
}

pub fn validate_wallet(wallet: &str) -> Result<Pubkey, HistoryError> {
    Pubkey::from_str(wallet).map_err(|err| HistoryError::invalid_address(wallet, err))
}
