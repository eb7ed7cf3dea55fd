//! Wallet trade classification and resilient history retrieval over Solana
//! JSON-RPC.

pub mod activity;
pub mod config;
pub mod core;
pub mod history;
pub mod response;
pub mod rpc;
pub mod types;

pub use crate::activity::{ActivityReport, ClassifiedTransaction, WalletActivity};
pub use crate::config::{AppConfig, HistoryConfig, RetryConfig};
pub use crate::core::error::{ConfigError, HistoryError, UpstreamError};
pub use crate::core::program_registry::ProgramRegistry;
pub use crate::core::transaction_classifier::{classify, classify_with, TransactionClassifier};
pub use crate::history::{
    Cancellation, HistoryFetcher, RetryPolicy, SignatureHistory, StopReason, TimeWindow,
    TransactionHistory,
};
pub use crate::response::{ClassificationResponse, ErrorResponse, HistoryResponse};
pub use crate::rpc::{LedgerSource, RpcLedger};
pub use crate::types::{
    Classification, ClassificationResult, Direction, SignatureInfo, TransactionRecord,
};
