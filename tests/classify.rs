use anyhow::Result;
use serde_json::json;
use solana_wallet_activity::core::constants::dex_programs;
use solana_wallet_activity::core::dex_detector::DexDetector;
use solana_wallet_activity::core::instruction_extractor::InstructionExtractor;
use solana_wallet_activity::{
    classify, ClassificationResponse, ClassificationResult, Direction, ProgramRegistry,
    TransactionClassifier, TransactionRecord,
};

#[path = "common/mod.rs"]
mod common;

use common::{load_fixture, MINT, WALLET};

fn approx_eq(actual: f64, expected: f64) {
    let diff = (actual - expected).abs();
    assert!(diff < 1e-9, "expected {expected}, got {actual}");
}

fn balance(owner: &str, mint: &str, ui_amount: f64) -> serde_json::Value {
    json!({
        "accountIndex": 1,
        "mint": mint,
        "owner": owner,
        "uiTokenAmount": {
            "amount": "0",
            "decimals": 6,
            "uiAmount": ui_amount,
            "uiAmountString": ui_amount.to_string(),
        }
    })
}

fn record_with_balances(
    pre: Vec<serde_json::Value>,
    post: Vec<serde_json::Value>,
) -> Result<TransactionRecord> {
    Ok(serde_json::from_value(json!({
        "slot": 1,
        "blockTime": 1_718_000_000,
        "meta": {
            "err": null,
            "fee": 5000,
            "preTokenBalances": pre,
            "postTokenBalances": post,
        },
        "transaction": {
            "signatures": ["synthetic"],
            "message": { "accountKeys": [WALLET], "instructions": [] }
        }
    }))?)
}

#[test]
fn jupiter_buy_fixture_is_classified() -> Result<()> {
    let record = load_fixture("jupiter_buy")?;
    let classification = classify(Some(&record), WALLET);

    assert_eq!(classification.result.direction(), Some(Direction::Buy));
    assert_eq!(classification.result.mint(), Some(MINT));
    approx_eq(classification.result.amount().unwrap_or_default(), 15.0);
    assert_eq!(
        classification.summary(),
        format!("BUY Transaction: Received 15 tokens of {MINT}")
    );

    assert_eq!(classification.signature.as_deref(), Some("jupiter-buy-signature"));
    assert_eq!(classification.fee, Some(5000));
    assert_eq!(classification.exchange_names(), vec!["Jupiter".to_string()]);
    let sol = classification.sol_change.as_ref().expect("wallet sol change");
    assert_eq!(sol.change, -500_005_000);

    // wsol leg by authority, token leg by destination account
    assert_eq!(classification.token_transfers.len(), 2);
    assert_eq!(classification.token_transfers[0].amount, "500000000");
    assert_eq!(classification.token_transfers[1].amount, "15000000");
    assert_eq!(classification.token_transfers[1].mint.as_deref(), Some(MINT));
    assert_eq!(classification.token_transfers[1].inner_index, Some(1));
    Ok(())
}

#[test]
fn raydium_sell_fixture_reports_first_changed_mint() -> Result<()> {
    let record = load_fixture("raydium_sell")?;
    let classification = classify(Some(&record), WALLET);

    // the wallet's wsol balance also moved; the earlier listed mint wins
    assert_eq!(
        classification.result,
        ClassificationResult::Sell {
            amount: 15.0,
            mint: MINT.to_string()
        }
    );
    assert_eq!(
        classification.summary(),
        format!("SELL Transaction: Sent 15 tokens of {MINT}")
    );
    assert_eq!(classification.dexes.len(), 1);
    assert_eq!(classification.dexes[0].program_id, dex_programs::RAYDIUM_AMM_V4);
    assert!(!classification.dexes[0].via_index);
    Ok(())
}

#[test]
fn indexed_program_ids_resolve_through_lookup_tables() -> Result<()> {
    let record = load_fixture("v0_indexed_buy")?;

    let keys = InstructionExtractor::account_keys(&record);
    assert_eq!(keys.len(), 6);
    assert_eq!(keys[5], dex_programs::JUPITER_V6);

    let instructions = InstructionExtractor::extract(&record);
    assert_eq!(instructions.len(), 3);
    assert!(instructions.iter().all(|ix| ix.program_id.is_none()));

    let registry = ProgramRegistry::builtin();
    let matches = DexDetector::new(registry).detect(&instructions);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].program_id, dex_programs::JUPITER_V6);
    assert_eq!((matches[0].outer_index, matches[0].inner_index), (1, None));
    assert_eq!(matches[1].program_id, dex_programs::RAYDIUM_AMM_V4);
    assert_eq!((matches[1].outer_index, matches[1].inner_index), (1, Some(0)));
    assert!(matches.iter().all(|found| found.via_index));

    // uiAmount is null here, the string form carries the value
    let classification = TransactionClassifier::new(registry).classify(Some(&record), WALLET);
    assert_eq!(
        classification.result,
        ClassificationResult::Buy {
            amount: 8.0,
            mint: MINT.to_string()
        }
    );
    assert_eq!(
        classification.exchange_names(),
        vec!["Jupiter".to_string(), "Raydium".to_string()]
    );
    Ok(())
}

#[test]
fn balance_reconciliation_buy_and_sell() -> Result<()> {
    let buy = record_with_balances(
        vec![balance(WALLET, MINT, 10.0)],
        vec![balance(WALLET, MINT, 25.0)],
    )?;
    assert_eq!(
        classify(Some(&buy), WALLET).result,
        ClassificationResult::Buy {
            amount: 15.0,
            mint: MINT.to_string()
        }
    );

    let sell = record_with_balances(
        vec![balance(WALLET, MINT, 25.0)],
        vec![balance(WALLET, MINT, 10.0)],
    )?;
    assert_eq!(
        classify(Some(&sell), WALLET).result,
        ClassificationResult::Sell {
            amount: 15.0,
            mint: MINT.to_string()
        }
    );
    Ok(())
}

#[test]
fn closed_position_counts_as_zero_after() -> Result<()> {
    let record = record_with_balances(vec![balance(WALLET, MINT, 5.0)], vec![])?;
    assert_eq!(
        classify(Some(&record), WALLET).result,
        ClassificationResult::Sell {
            amount: 5.0,
            mint: MINT.to_string()
        }
    );
    Ok(())
}

#[test]
fn fresh_position_counts_as_zero_before() -> Result<()> {
    let record = record_with_balances(vec![], vec![balance(WALLET, MINT, 8.0)])?;
    assert_eq!(
        classify(Some(&record), WALLET).result,
        ClassificationResult::Buy {
            amount: 8.0,
            mint: MINT.to_string()
        }
    );
    Ok(())
}

#[test]
fn other_owners_are_ignored() -> Result<()> {
    let stranger = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";
    let record = record_with_balances(
        vec![balance(stranger, MINT, 1.0)],
        vec![balance(stranger, MINT, 100.0)],
    )?;
    let classification = classify(Some(&record), WALLET);
    assert_eq!(classification.result, ClassificationResult::Indeterminate);
    assert_eq!(
        classification.summary(),
        "Transaction detected but could not determine buy/sell."
    );

    let unchanged = record_with_balances(
        vec![balance(WALLET, MINT, 3.0)],
        vec![balance(WALLET, MINT, 3.0)],
    )?;
    assert_eq!(
        classify(Some(&unchanged), WALLET).result,
        ClassificationResult::Indeterminate
    );
    Ok(())
}

#[test]
fn missing_meta_or_message_is_invalid() -> Result<()> {
    assert!(classify(None, WALLET).result.is_invalid());

    let no_meta: TransactionRecord = serde_json::from_value(json!({
        "slot": 1,
        "transaction": { "signatures": ["x"], "message": { "accountKeys": [], "instructions": [] } }
    }))?;
    assert!(classify(Some(&no_meta), WALLET).result.is_invalid());

    let no_message: TransactionRecord = serde_json::from_value(json!({
        "slot": 1,
        "meta": { "err": null, "fee": 5000 },
        "transaction": { "signatures": ["x"] }
    }))?;
    let classification = classify(Some(&no_message), WALLET);
    assert!(classification.result.is_invalid());

    let response = ClassificationResponse::from(&classification);
    assert!(!response.success);
    assert!(response.summary.starts_with("Invalid transaction or not found"));
    Ok(())
}

#[test]
fn classification_is_pure() -> Result<()> {
    let record = load_fixture("jupiter_buy")?;
    let before = record.clone();
    let first = classify(Some(&record), WALLET);
    let second = classify(Some(&record), WALLET);
    assert_eq!(first, second);
    assert_eq!(record, before);
    Ok(())
}

#[test]
fn unknown_exchanges_do_not_change_the_verdict() -> Result<()> {
    let record = load_fixture("raydium_sell")?;
    let empty = ProgramRegistry::empty();
    let without = TransactionClassifier::new(&empty).classify(Some(&record), WALLET);
    let with = classify(Some(&record), WALLET);

    assert!(without.dexes.is_empty());
    assert_eq!(without.result, with.result);
    Ok(())
}
