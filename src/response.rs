use serde::Serialize;

use crate::activity::{ActivityReport, ClassifiedTransaction};
use crate::history::{
    FetchFailure, FetchedTransaction, SignatureHistory, StopReason, TransactionHistory,
};
use crate::types::{Classification, Direction, SignatureInfo};

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResponse {
    pub success: bool,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    pub dexes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl From<&Classification> for ClassificationResponse {
    fn from(classification: &Classification) -> Self {
        let result = &classification.result;
        Self {
            success: !result.is_invalid(),
            summary: result.summary(),
            direction: result.direction(),
            amount: result.amount(),
            mint: result.mint().map(str::to_string),
            dexes: classification.exchange_names(),
            signature: classification.signature.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse<T> {
    pub success: bool,
    pub count: usize,
    pub transactions: Vec<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FetchFailure>,
    pub stop_reason: StopReason,
}

impl<T> HistoryResponse<T> {
    pub fn new(transactions: Vec<T>, failures: Vec<FetchFailure>, stop_reason: StopReason) -> Self {
        Self {
            success: true,
            count: transactions.len(),
            transactions,
            failures,
            stop_reason,
        }
    }
}

impl From<SignatureHistory> for HistoryResponse<SignatureInfo> {
    fn from(history: SignatureHistory) -> Self {
        Self::new(history.signatures, Vec::new(), history.stop)
    }
}

impl From<TransactionHistory> for HistoryResponse<FetchedTransaction> {
    fn from(history: TransactionHistory) -> Self {
        Self::new(history.transactions, history.failures, history.stop)
    }
}

impl From<ActivityReport> for HistoryResponse<ClassifiedTransaction> {
    fn from(report: ActivityReport) -> Self {
        Self::new(report.transactions, report.failures, report.stop)
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: &dyn std::fmt::Display) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: error.to_string(),
        }
    }
}
