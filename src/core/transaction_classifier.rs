use crate::core::balance_delta::{BalanceDeltaCalculator, NetDelta};
use crate::core::dex_detector::DexDetector;
use crate::core::instruction_extractor::InstructionExtractor;
use crate::core::program_registry::ProgramRegistry;
use crate::types::{Classification, ClassificationResult, TokenTransfer, TransactionRecord};

/// Classifies a transaction for one wallet. Pure: the same record, wallet and
/// registry always produce the same result.
#[derive(Clone, Copy, Debug)]
pub struct TransactionClassifier<'a> {
    registry: &'a ProgramRegistry,
}

impl Default for TransactionClassifier<'static> {
    fn default() -> Self {
        Self::new(ProgramRegistry::builtin())
    }
}

impl<'a> TransactionClassifier<'a> {
    pub fn new(registry: &'a ProgramRegistry) -> Self {
        Self { registry }
    }

    pub fn classify(&self, record: Option<&TransactionRecord>, wallet: &str) -> Classification {
        let Some(record) = record else {
            return Classification::invalid("transaction not found");
        };
        let Some(meta) = record.meta.as_ref() else {
            return Classification::invalid("transaction is missing meta");
        };
        if record.message().is_none() {
            return Classification::invalid("transaction is missing message");
        }

        let instructions = InstructionExtractor::extract(record);
        let dexes = DexDetector::new(self.registry).detect(&instructions);
        if dexes.is_empty() {
            tracing::debug!(
                signature = ?record.signature(),
                "no known exchange program participated"
            );
        }

        let net = BalanceDeltaCalculator::for_record(record, wallet);
        let result = Self::verdict(&net);

        let wallet_accounts = BalanceDeltaCalculator::wallet_token_accounts(record, wallet);
        let token_transfers: Vec<TokenTransfer> = instructions
            .iter()
            .filter_map(|ix| ix.token_transfer())
            .filter(|transfer| {
                transfer.authority.as_deref() == Some(wallet)
                    || transfer.source == wallet
                    || transfer.destination == wallet
                    || wallet_accounts.contains(&transfer.source)
                    || wallet_accounts.contains(&transfer.destination)
            })
            .collect();

        tracing::debug!(
            signature = ?record.signature(),
            mints = net.len(),
            dexes = dexes.len(),
            verdict = %result.summary(),
            "transaction classified"
        );

        Classification {
            result,
            signature: record.signature().map(str::to_string),
            block_time: record.block_time,
            fee: meta.fee,
            dexes,
            sol_change: BalanceDeltaCalculator::sol_change(record, wallet),
            token_transfers,
        }
    }

    /// First mint with a directional change wins. Later legs of a multi-asset
    /// swap are not reported.
    pub fn verdict(net: &NetDelta) -> ClassificationResult {
        for (mint, delta) in net.iter() {
            if delta.after > delta.before {
                return ClassificationResult::Buy {
                    amount: delta.after - delta.before,
                    mint: mint.to_string(),
                };
            }
            if delta.before > delta.after {
                return ClassificationResult::Sell {
                    amount: delta.before - delta.after,
                    mint: mint.to_string(),
                };
            }
        }
        ClassificationResult::Indeterminate
    }
}

/// Classifies with the built-in registry.
pub fn classify(record: Option<&TransactionRecord>, wallet: &str) -> Classification {
    TransactionClassifier::default().classify(record, wallet)
}

pub fn classify_with(
    record: Option<&TransactionRecord>,
    wallet: &str,
    registry: &ProgramRegistry,
) -> Classification {
    TransactionClassifier::new(registry).classify(record, wallet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RecordMessage, RecordMeta, RecordTransaction};

    #[test]
    fn missing_pieces_are_invalid() {
        assert!(classify(None, "W").result.is_invalid());

        let no_meta = TransactionRecord {
            transaction: Some(RecordTransaction {
                signatures: None,
                message: Some(RecordMessage::default()),
            }),
            ..Default::default()
        };
        assert!(classify(Some(&no_meta), "W").result.is_invalid());

        let no_message = TransactionRecord {
            meta: Some(RecordMeta::default()),
            transaction: Some(RecordTransaction::default()),
            ..Default::default()
        };
        assert!(classify(Some(&no_message), "W").result.is_invalid());
    }

    #[test]
    fn empty_but_well_formed_record_is_indeterminate() {
        let record = TransactionRecord {
            meta: Some(RecordMeta::default()),
            transaction: Some(RecordTransaction {
                signatures: Some(vec!["sig".to_string()]),
                message: Some(RecordMessage::default()),
            }),
            ..Default::default()
        };
        let classification = classify(Some(&record), "W");
        assert_eq!(classification.result, ClassificationResult::Indeterminate);
        assert_eq!(classification.signature.as_deref(), Some("sig"));
    }
}
