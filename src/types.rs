use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token amount as reported inside a balance snapshot.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub decimals: u8,
    #[serde(default)]
    pub ui_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_amount_string: Option<String>,
}

impl UiTokenAmount {
    pub fn new(amount: impl Into<String>, decimals: u8, ui_amount: Option<f64>) -> Self {
        Self {
            amount: amount.into(),
            decimals,
            ui_amount,
            ui_amount_string: ui_amount.map(|value| value.to_string()),
        }
    }

    /// UI amount with `uiAmountString` as fallback; a missing amount counts as zero.
    pub fn value(&self) -> f64 {
        self.ui_amount
            .or_else(|| {
                self.ui_amount_string
                    .as_deref()
                    .and_then(|raw| raw.parse::<f64>().ok())
            })
            .unwrap_or(0.0)
    }
}

/// Lamport balance change helper for native SOL.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    pub pre: i128,
    pub post: i128,
    pub change: i128,
}

/// One entry of `preTokenBalances` / `postTokenBalances`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    #[serde(default)]
    pub account_index: usize,
    #[serde(default)]
    pub mint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(default)]
    pub ui_token_amount: UiTokenAmount,
}

/// Account key as delivered by either `json` (bare string) or `jsonParsed` encoding.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AccountKey {
    Plain(String),
    Parsed(ParsedAccountKey),
}

impl AccountKey {
    pub fn pubkey(&self) -> &str {
        match self {
            AccountKey::Plain(key) => key,
            AccountKey::Parsed(parsed) => &parsed.pubkey,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, AccountKey::Parsed(_))
    }
}

impl From<&str> for AccountKey {
    fn from(value: &str) -> Self {
        AccountKey::Plain(value.to_string())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAccountKey {
    pub pubkey: String,
    #[serde(default)]
    pub signer: bool,
    #[serde(default)]
    pub writable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Decoded instruction payload. Programs without a `{type, info}` shape
/// (memo and friends) land in `Opaque`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParsedPayload {
    Typed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        info: Value,
    },
    Opaque(Value),
}

impl ParsedPayload {
    pub fn kind(&self) -> Option<&str> {
        match self {
            ParsedPayload::Typed { kind, .. } => Some(kind),
            ParsedPayload::Opaque(_) => None,
        }
    }

    pub fn info(&self) -> Option<&Value> {
        match self {
            ParsedPayload::Typed { info, .. } => Some(info),
            ParsedPayload::Opaque(_) => None,
        }
    }
}

/// Instruction exactly as it appears in a record. Direct instructions carry
/// `programId`; compiled ones carry `programIdIndex`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawInstruction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_height: Option<u32>,
}

impl RawInstruction {
    pub fn direct(program_id: impl Into<String>) -> Self {
        Self {
            program_id: Some(program_id.into()),
            ..Default::default()
        }
    }

    pub fn indexed(program_id_index: usize) -> Self {
        Self {
            program_id_index: Some(program_id_index),
            ..Default::default()
        }
    }
}

/// Inner instruction group emitted by the outer instruction at `index`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InnerInstructionGroup {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub instructions: Vec<RawInstruction>,
}

/// Address lookup table keys of a v0 transaction.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadedAddresses {
    #[serde(default)]
    pub writable: Vec<String>,
    #[serde(default)]
    pub readonly: Vec<String>,
}

/// Status meta block of a transaction record.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    #[serde(default)]
    pub fee: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<Value>,
    #[serde(default)]
    pub pre_balances: Option<Vec<u64>>,
    #[serde(default)]
    pub post_balances: Option<Vec<u64>>,
    #[serde(default)]
    pub pre_token_balances: Option<Vec<TokenBalance>>,
    #[serde(default)]
    pub post_token_balances: Option<Vec<TokenBalance>>,
    #[serde(default)]
    pub inner_instructions: Option<Vec<InnerInstructionGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_messages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_units_consumed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_addresses: Option<LoadedAddresses>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordMessage {
    #[serde(default)]
    pub account_keys: Option<Vec<AccountKey>>,
    #[serde(default)]
    pub instructions: Option<Vec<RawInstruction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_blockhash: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransaction {
    #[serde(default)]
    pub signatures: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<RecordMessage>,
}

/// `getTransaction` result as returned by the RPC node.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<RecordMeta>,
    #[serde(default)]
    pub transaction: Option<RecordTransaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
}

impl TransactionRecord {
    pub fn message(&self) -> Option<&RecordMessage> {
        self.transaction.as_ref()?.message.as_ref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.transaction
            .as_ref()?
            .signatures
            .as_ref()?
            .first()
            .map(String::as_str)
    }
}

/// One entry of `getSignaturesForAddress`, newest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
}

/// Parsed SPL token transfer touching the classified wallet.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    pub source: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    pub amount: String,
    pub outer_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_index: Option<usize>,
}

/// A registered exchange program seen in a transaction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DexMatch {
    pub program_id: String,
    pub exchanges: Vec<String>,
    pub outer_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_index: Option<usize>,
    /// True when the id came from resolving `programIdIndex`.
    pub via_index: bool,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

/// Verdict for a single transaction and wallet.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationResult {
    Buy { amount: f64, mint: String },
    Sell { amount: f64, mint: String },
    Indeterminate,
    Invalid { reason: String },
}

impl ClassificationResult {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Buy { .. } => Some(Direction::Buy),
            Self::Sell { .. } => Some(Direction::Sell),
            _ => None,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Buy { amount, .. } | Self::Sell { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    pub fn mint(&self) -> Option<&str> {
        match self {
            Self::Buy { mint, .. } | Self::Sell { mint, .. } => Some(mint),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Buy { amount, mint } => {
                format!("BUY Transaction: Received {amount} tokens of {mint}")
            }
            Self::Sell { amount, mint } => {
                format!("SELL Transaction: Sent {amount} tokens of {mint}")
            }
            Self::Indeterminate => {
                "Transaction detected but could not determine buy/sell.".to_string()
            }
            Self::Invalid { reason } => format!("Invalid transaction or not found: {reason}"),
        }
    }
}

/// Verdict plus the informational context gathered while computing it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub result: ClassificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,
    #[serde(default)]
    pub dexes: Vec<DexMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sol_change: Option<BalanceChange>,
    #[serde(default)]
    pub token_transfers: Vec<TokenTransfer>,
}

impl Classification {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            result: ClassificationResult::invalid(reason),
            signature: None,
            block_time: None,
            fee: None,
            dexes: Vec::new(),
            sol_change: None,
            token_transfers: Vec::new(),
        }
    }

    pub fn summary(&self) -> String {
        self.result.summary()
    }

    /// Distinct exchange names in detection order.
    pub fn exchange_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.dexes.iter().flat_map(|m| m.exchanges.iter()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}
