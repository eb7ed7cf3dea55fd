use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::instruction_extractor::InstructionExtractor;
use crate::types::{BalanceChange, TokenBalance, TransactionRecord};

/// Before/after holdings of one mint for the target wallet.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MintDelta {
    pub before: f64,
    pub after: f64,
}

impl MintDelta {
    pub fn change(&self) -> f64 {
        self.after - self.before
    }
}

/// Per-mint deltas in insertion order (pre-list first, then mints that only
/// appear in the post-list).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetDelta {
    entries: Vec<(String, MintDelta)>,
}

impl NetDelta {
    fn entry(&mut self, mint: &str) -> Option<&mut MintDelta> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == mint)
            .map(|(_, delta)| delta)
    }

    pub fn get(&self, mint: &str) -> Option<&MintDelta> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == mint)
            .map(|(_, delta)| delta)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MintDelta)> {
        self.entries.iter().map(|(mint, delta)| (mint.as_str(), delta))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct BalanceDeltaCalculator;

impl BalanceDeltaCalculator {
    /// Reconciles pre/post token snapshots for `wallet`. A mint missing from
    /// the post-list keeps `after = 0`; a mint only in the post-list starts
    /// at `before = 0`. Several accounts of the same owner and mint add up.
    pub fn compute(pre: &[TokenBalance], post: &[TokenBalance], wallet: &str) -> NetDelta {
        let mut net = NetDelta::default();

        for balance in pre.iter().filter(|b| owned_by(b, wallet)) {
            let amount = balance.ui_token_amount.value();
            match net.entry(&balance.mint) {
                Some(delta) => delta.before += amount,
                None => net.entries.push((
                    balance.mint.clone(),
                    MintDelta {
                        before: amount,
                        after: 0.0,
                    },
                )),
            }
        }

        for balance in post.iter().filter(|b| owned_by(b, wallet)) {
            let amount = balance.ui_token_amount.value();
            match net.entry(&balance.mint) {
                Some(delta) => delta.after += amount,
                None => net.entries.push((
                    balance.mint.clone(),
                    MintDelta {
                        before: 0.0,
                        after: amount,
                    },
                )),
            }
        }

        net
    }

    /// Convenience wrapper reading both snapshot lists off a record; absent
    /// lists count as empty.
    pub fn for_record(record: &TransactionRecord, wallet: &str) -> NetDelta {
        let meta = record.meta.as_ref();
        let pre = meta
            .and_then(|m| m.pre_token_balances.as_deref())
            .unwrap_or(&[]);
        let post = meta
            .and_then(|m| m.post_token_balances.as_deref())
            .unwrap_or(&[]);
        Self::compute(pre, post, wallet)
    }

    /// Native lamport change of `wallet`, if it is one of the account keys and
    /// both balance arrays cover it.
    pub fn sol_change(record: &TransactionRecord, wallet: &str) -> Option<BalanceChange> {
        let meta = record.meta.as_ref()?;
        let keys = InstructionExtractor::account_keys(record);
        let index = keys.iter().position(|key| key == wallet)?;
        let pre = *meta.pre_balances.as_ref()?.get(index)? as i128;
        let post = *meta.post_balances.as_ref()?.get(index)? as i128;
        Some(BalanceChange {
            pre,
            post,
            change: post - pre,
        })
    }

    /// Token account addresses the wallet owns according to either snapshot.
    pub fn wallet_token_accounts(record: &TransactionRecord, wallet: &str) -> HashSet<String> {
        let keys = InstructionExtractor::account_keys(record);
        let Some(meta) = record.meta.as_ref() else {
            return HashSet::new();
        };
        meta.pre_token_balances
            .iter()
            .chain(meta.post_token_balances.iter())
            .flatten()
            .filter(|b| owned_by(b, wallet))
            .filter_map(|b| keys.get(b.account_index).cloned())
            .collect()
    }
}

fn owned_by(balance: &TokenBalance, wallet: &str) -> bool {
    !balance.mint.is_empty() && balance.owner.as_deref() == Some(wallet)
}
