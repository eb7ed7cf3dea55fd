#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use solana_wallet_activity::types::{
    RecordMessage, RecordMeta, RecordTransaction, SignatureInfo, TransactionRecord,
};
use solana_wallet_activity::{LedgerSource, UpstreamError};
use tokio::time::Instant;

pub const WALLET: &str = "5Pk716N113awdSaUDZEPZVi9Zs6hJmG5KCJtp5qQK3LB";
pub const MINT: &str = "4wBqpZM9xaSheZzJSMawUKKwhdpChKbZ5eu5ky4Vigw";

pub fn load_fixture(name: &str) -> Result<TransactionRecord> {
    let path = format!("tests/fixtures/{name}.json");
    let data = fs::read(&path).with_context(|| format!("failed to read {path}"))?;
    serde_json::from_slice(&data).with_context(|| format!("failed to parse {path}"))
}

pub fn signature_info(signature: &str, block_time: Option<i64>) -> SignatureInfo {
    SignatureInfo {
        signature: signature.to_string(),
        block_time,
        confirmation_status: Some("finalized".to_string()),
        ..Default::default()
    }
}

/// Newest-first history with block times counting down from `newest` in
/// steps of `step`. Signatures are `sig-0`, `sig-1`, ...
pub fn descending_history(count: usize, newest: i64, step: i64) -> Vec<SignatureInfo> {
    (0..count)
        .map(|i| signature_info(&format!("sig-{i}"), Some(newest - i as i64 * step)))
        .collect()
}

/// Well-formed record with no balances, classified as indeterminate.
pub fn stub_record(signature: &str) -> TransactionRecord {
    TransactionRecord {
        meta: Some(RecordMeta::default()),
        transaction: Some(RecordTransaction {
            signatures: Some(vec![signature.to_string()]),
            message: Some(RecordMessage::default()),
        }),
        ..Default::default()
    }
}

pub fn transport_error() -> UpstreamError {
    UpstreamError::transport("getTransaction", "connection reset by peer")
}

pub type Outcome = Result<Option<TransactionRecord>, UpstreamError>;

#[derive(Default)]
struct State {
    history: Vec<SignatureInfo>,
    ignore_cursor: bool,
    page_error: Option<UpstreamError>,
    page_latency: Duration,
    records: HashMap<String, TransactionRecord>,
    scripts: HashMap<String, VecDeque<Outcome>>,
    always_fail: Vec<String>,
    page_calls: Vec<(Option<String>, Instant)>,
    transaction_calls: Vec<(String, Instant)>,
}

/// In-memory ledger that pages through a fixed history the way the RPC node
/// does and records when every call happened.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<State>,
}

impl MockLedger {
    pub fn new(history: Vec<SignatureInfo>) -> Self {
        let ledger = Self::default();
        ledger.state.lock().unwrap().history = history;
        ledger
    }

    pub fn with_record(self, signature: &str, record: TransactionRecord) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .insert(signature.to_string(), record);
        self
    }

    /// Outcomes returned in order for `signature` before falling back to the
    /// registered record.
    pub fn with_script(self, signature: &str, outcomes: Vec<Outcome>) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(signature.to_string(), outcomes.into());
        self
    }

    pub fn always_failing(self, signature: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .always_fail
            .push(signature.to_string());
        self
    }

    pub fn failing_pages(self, error: UpstreamError) -> Self {
        self.state.lock().unwrap().page_error = Some(error);
        self
    }

    /// Serve the newest page for every request, as a node that drops `before`.
    pub fn ignoring_cursor(self) -> Self {
        self.state.lock().unwrap().ignore_cursor = true;
        self
    }

    pub fn with_page_latency(self, latency: Duration) -> Self {
        self.state.lock().unwrap().page_latency = latency;
        self
    }

    pub fn page_calls(&self) -> Vec<(Option<String>, Instant)> {
        self.state.lock().unwrap().page_calls.clone()
    }

    pub fn transaction_calls(&self) -> Vec<(String, Instant)> {
        self.state.lock().unwrap().transaction_calls.clone()
    }

    pub fn attempts_for(&self, signature: &str) -> Vec<Instant> {
        self.transaction_calls()
            .into_iter()
            .filter(|(called, _)| called == signature)
            .map(|(_, at)| at)
            .collect()
    }
}

#[async_trait]
impl LedgerSource for MockLedger {
    async fn signatures_for_address(
        &self,
        _address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureInfo>, UpstreamError> {
        let latency = {
            let mut state = self.state.lock().unwrap();
            state
                .page_calls
                .push((before.map(str::to_string), Instant::now()));
            state.page_latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.lock().unwrap();
        if let Some(error) = &state.page_error {
            return Err(error.clone());
        }
        let start = match before {
            Some(_) if state.ignore_cursor => 0,
            Some(cursor) => state
                .history
                .iter()
                .position(|info| info.signature == cursor)
                .map_or(state.history.len(), |pos| pos + 1),
            None => 0,
        };
        Ok(state.history.iter().skip(start).take(limit).cloned().collect())
    }

    async fn transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionRecord>, UpstreamError> {
        let mut state = self.state.lock().unwrap();
        state
            .transaction_calls
            .push((signature.to_string(), Instant::now()));

        if state.always_fail.iter().any(|failing| failing == signature) {
            return Err(transport_error());
        }
        if let Some(outcome) = state
            .scripts
            .get_mut(signature)
            .and_then(VecDeque::pop_front)
        {
            return outcome;
        }
        Ok(Some(
            state
                .records
                .get(signature)
                .cloned()
                .unwrap_or_else(|| stub_record(signature)),
        ))
    }
}

/// Asserts `actual` is `expected_ms` up to timer-wheel rounding.
pub fn assert_gap(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    let slack = Duration::from_millis(2);
    assert!(
        actual >= expected && actual <= expected + slack,
        "expected a gap of {expected_ms}ms, got {actual:?}"
    );
}

pub fn gaps(instants: &[Instant]) -> Vec<Duration> {
    instants.windows(2).map(|pair| pair[1] - pair[0]).collect()
}
