//! History retrieval joined with classification: one verdict per retained
//! transaction of a wallet.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AppConfig;
use crate::core::error::HistoryError;
use crate::core::program_registry::ProgramRegistry;
use crate::core::transaction_classifier::TransactionClassifier;
use crate::history::{
    Cancellation, FetchFailure, HistoryFetcher, StopReason, TimeWindow, TransactionHistory,
};
use crate::rpc::LedgerSource;
use crate::types::{Classification, Direction};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedTransaction {
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<i64>,
    pub classification: Classification,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub wallet: String,
    pub transactions: Vec<ClassifiedTransaction>,
    pub failures: Vec<FetchFailure>,
    pub missing: Vec<String>,
    pub pages: usize,
    pub stop: StopReason,
}

impl ActivityReport {
    pub fn count(&self, direction: Direction) -> usize {
        self.transactions
            .iter()
            .filter(|tx| tx.classification.result.direction() == Some(direction))
            .count()
    }
}

pub struct WalletActivity<S> {
    fetcher: HistoryFetcher<S>,
    registry: ProgramRegistry,
}

impl<S: LedgerSource> WalletActivity<S> {
    pub fn new(fetcher: HistoryFetcher<S>, registry: ProgramRegistry) -> Self {
        Self { fetcher, registry }
    }

    pub fn from_config(source: S, config: &AppConfig) -> Self {
        Self::new(
            HistoryFetcher::with_config(source, config.history.clone()),
            config.registry(),
        )
    }

    /// Fetches every record of `wallet` inside `window` and classifies each
    /// one, keeping the newest-first order of the history.
    pub async fn scan(
        &self,
        wallet: &str,
        window: TimeWindow,
        cancel: &Cancellation,
    ) -> Result<ActivityReport, HistoryError> {
        let history = self.fetcher.transactions(wallet, window, cancel).await?;
        let report = self.classify_history(wallet, history);
        info!(
            wallet,
            classified = report.transactions.len(),
            buys = report.count(Direction::Buy),
            sells = report.count(Direction::Sell),
            "wallet scan finished"
        );
        Ok(report)
    }

    fn classify_history(&self, wallet: &str, history: TransactionHistory) -> ActivityReport {
        let classifier = TransactionClassifier::new(&self.registry);
        let transactions = history
            .transactions
            .into_iter()
            .map(|fetched| ClassifiedTransaction {
                block_time: fetched.record.block_time,
                classification: classifier.classify(Some(&fetched.record), wallet),
                signature: fetched.signature,
            })
            .collect();

        ActivityReport {
            wallet: wallet.to_string(),
            transactions,
            failures: history.failures,
            missing: history.missing,
            pages: history.pages,
            stop: history.stop,
        }
    }
}
