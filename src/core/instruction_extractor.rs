use once_cell::sync::Lazy;
use serde_json::Value;

use crate::types::{AccountKey, ParsedPayload, RawInstruction, TokenTransfer, TransactionRecord};

const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

static TOKEN_PROGRAM_IDS: Lazy<[String; 2]> =
    Lazy::new(|| [spl_token::id().to_string(), TOKEN_2022_PROGRAM_ID.to_string()]);

/// Instruction flattened out of a record with its position and both forms of
/// program reference.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedInstruction {
    pub outer_index: usize,
    pub inner_index: Option<usize>,
    pub program_id: Option<String>,
    pub program_id_index: Option<usize>,
    /// `accountKeys[program_id_index]`, when that index resolves.
    pub resolved_program_id: Option<String>,
    pub program: Option<String>,
    pub parsed: Option<ParsedPayload>,
}

impl ExtractedInstruction {
    fn from_raw(
        raw: &RawInstruction,
        outer_index: usize,
        inner_index: Option<usize>,
        account_keys: &[String],
    ) -> Self {
        let resolved_program_id = raw
            .program_id_index
            .and_then(|index| account_keys.get(index))
            .filter(|key| !key.is_empty())
            .cloned();

        Self {
            outer_index,
            inner_index,
            program_id: raw.program_id.clone().filter(|id| !id.is_empty()),
            program_id_index: raw.program_id_index,
            resolved_program_id,
            program: raw.program.clone(),
            parsed: raw.parsed.clone(),
        }
    }

    /// Direct id when present, otherwise the index-resolved one.
    pub fn program_id(&self) -> Option<&str> {
        self.program_id
            .as_deref()
            .or(self.resolved_program_id.as_deref())
    }

    /// `"0"` for outer instructions, `"0-2"` for the third inner instruction of
    /// outer instruction 0.
    pub fn position(&self) -> String {
        match self.inner_index {
            Some(inner) => format!("{}-{}", self.outer_index, inner),
            None => self.outer_index.to_string(),
        }
    }

    fn is_token_program(&self) -> bool {
        if self.program.as_deref() == Some("spl-token") {
            return true;
        }
        self.program_id()
            .map_or(false, |id| TOKEN_PROGRAM_IDS.iter().any(|token| token == id))
    }

    /// Parsed SPL `transfer` / `transferChecked` payload, if this is one.
    pub fn token_transfer(&self) -> Option<TokenTransfer> {
        let parsed = self.parsed.as_ref()?;
        if !matches!(parsed.kind(), Some("transfer" | "transferChecked"))
            || !self.is_token_program()
        {
            return None;
        }
        let info = parsed.info()?;

        let source = string_field(info, "source")?;
        let destination = string_field(info, "destination")?;
        let amount = string_field(info, "amount").or_else(|| {
            info.get("tokenAmount")
                .and_then(|token_amount| string_field(token_amount, "amount"))
        })?;

        Some(TokenTransfer {
            source,
            destination,
            authority: string_field(info, "authority")
                .or_else(|| string_field(info, "multisigAuthority")),
            mint: string_field(info, "mint"),
            amount,
            outer_index: self.outer_index,
            inner_index: self.inner_index,
        })
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

pub struct InstructionExtractor;

impl InstructionExtractor {
    /// Account keys used for index resolution. Bare-string key lists come from
    /// `json` encoding and do not include lookup-table addresses, so those are
    /// appended (writable, then readonly) the way the runtime orders them.
    pub fn account_keys(record: &TransactionRecord) -> Vec<String> {
        let Some(keys) = record
            .message()
            .and_then(|message| message.account_keys.as_ref())
        else {
            return Vec::new();
        };

        let mut out: Vec<String> = keys.iter().map(|key| key.pubkey().to_string()).collect();
        if !keys.iter().any(AccountKey::is_parsed) {
            if let Some(loaded) = record
                .meta
                .as_ref()
                .and_then(|meta| meta.loaded_addresses.as_ref())
            {
                out.extend(loaded.writable.iter().cloned());
                out.extend(loaded.readonly.iter().cloned());
            }
        }
        out
    }

    /// Outer instructions followed by every inner group, in group order.
    /// Nothing is filtered out here.
    pub fn extract(record: &TransactionRecord) -> Vec<ExtractedInstruction> {
        let account_keys = Self::account_keys(record);

        let outer: &[RawInstruction] = record
            .message()
            .and_then(|message| message.instructions.as_deref())
            .unwrap_or(&[]);
        let groups = record
            .meta
            .as_ref()
            .and_then(|meta| meta.inner_instructions.as_deref())
            .unwrap_or(&[]);

        let inner_count = groups.iter().map(|group| group.instructions.len()).sum::<usize>();
        let mut out = Vec::with_capacity(outer.len() + inner_count);

        for (outer_index, raw) in outer.iter().enumerate() {
            out.push(ExtractedInstruction::from_raw(raw, outer_index, None, &account_keys));
        }
        for group in groups {
            for (inner_index, raw) in group.instructions.iter().enumerate() {
                out.push(ExtractedInstruction::from_raw(
                    raw,
                    group.index,
                    Some(inner_index),
                    &account_keys,
                ));
            }
        }

        tracing::debug!(
            outer = outer.len(),
            inner = inner_count,
            groups = groups.len(),
            "extracted instructions"
        );
        out
    }
}
