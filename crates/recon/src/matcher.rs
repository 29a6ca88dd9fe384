//! Pairing rules: unique amount+date (1), check clearing (4), bucketed residual
//! transfers (11).
//!
//! A row that qualifies for both sides of one rule is placed on the bank side
//! only, so no row can be paired with itself or paired twice.

use std::collections::HashMap;

use crate::config::{CheckConfig, CrossMatchConfig, ResidualTransferConfig};
use crate::model::RuleId;
use crate::normalize::{amount_key, to_cents, NormalizedRow};
use crate::state::MatchState;

/// Keyed groups that remember first-appearance order of their keys.
struct OrderedGroups<K> {
    order: Vec<K>,
    groups: HashMap<K, Vec<usize>>,
}

impl<K: std::hash::Hash + Eq + Clone> OrderedGroups<K> {
    fn new() -> Self {
        Self { order: Vec::new(), groups: HashMap::new() }
    }

    fn push(&mut self, key: K, idx: usize) {
        self.groups
            .entry(key.clone())
            .or_insert_with(|| {
                self.order.push(key);
                Vec::new()
            })
            .push(idx);
    }

    fn get(&self, key: &K) -> &[usize] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn iter(&self) -> impl Iterator<Item = (&K, &[usize])> {
        self.order.iter().map(|k| (k, self.get(k)))
    }
}

// ---------------------------------------------------------------------------
// Rule 1
// ---------------------------------------------------------------------------

fn is_cross_bank(row: &NormalizedRow, cfg: &CrossMatchConfig) -> bool {
    row.code.is_some_and(|c| cfg.codes.contains(&c))
        && row.bank_amount.is_some_and(|a| a < 0.0)
        && !row.date.is_empty()
}

fn is_cross_books(row: &NormalizedRow, cfg: &CrossMatchConfig) -> bool {
    row.books_amount.is_some_and(|a| a > 0.0)
        && !row.date.is_empty()
        && cfg.book_prefixes.iter().any(|p| row.ref1_has_prefix(p))
}

/// Pair bank and books rows sharing (|amount|, date) when that key is unique on
/// both sides. Returns the number of rows tagged.
pub fn match_unique_amount_date(state: &mut MatchState, cfg: &CrossMatchConfig, rule: RuleId) -> usize {
    let mut bank = OrderedGroups::new();
    let mut books = OrderedGroups::new();

    for (idx, row) in state.unmatched() {
        if is_cross_bank(row, cfg) {
            if let Some(amount) = row.bank_amount {
                bank.push((amount_key(amount), row.date.clone()), idx);
            }
        } else if is_cross_books(row, cfg) {
            if let Some(amount) = row.books_amount {
                books.push((amount_key(amount), row.date.clone()), idx);
            }
        }
    }

    let pairs: Vec<(usize, usize)> = bank
        .iter()
        .filter_map(|(key, bank_idx)| match (bank_idx, books.get(key)) {
            ([b], [a]) => Some((*b, *a)),
            _ => None,
        })
        .collect();

    let mut tagged = 0;
    for (b, a) in pairs {
        tagged += usize::from(state.claim(b, rule));
        tagged += usize::from(state.claim(a, rule));
    }
    tagged
}

// ---------------------------------------------------------------------------
// Rule 4
// ---------------------------------------------------------------------------

/// Check-number key: digits only, leading zeros dropped, `"0"` when nothing is left.
pub fn digits_key(reference: &str) -> String {
    let digits: String = reference.chars().filter(char::is_ascii_digit).collect();
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

struct CheckCandidate {
    idx: usize,
    key: String,
    cents: i64,
}

fn is_check_bank(row: &NormalizedRow, cfg: &CheckConfig) -> bool {
    row.code == Some(cfg.code) && !row.ref1.trim().is_empty() && row.bank_amount.is_some()
}

fn is_check_books(row: &NormalizedRow, cfg: &CheckConfig) -> bool {
    row.ref1_has_prefix(&cfg.book_prefix) && !row.ref2.trim().is_empty() && row.books_amount.is_some()
}

/// Greedy first-fit check clearing: bank ref1 vs books ref2 on the digits key,
/// absolute amounts within `cfg.tolerance` (inclusive). Returns rows tagged.
pub fn match_checks(state: &mut MatchState, cfg: &CheckConfig, rule: RuleId) -> usize {
    let mut bank = Vec::new();
    let mut books = Vec::new();

    for (idx, row) in state.unmatched() {
        if is_check_bank(row, cfg) {
            if let Some(amount) = row.bank_amount {
                bank.push(CheckCandidate { idx, key: digits_key(&row.ref1), cents: to_cents(amount.abs()) });
            }
        } else if is_check_books(row, cfg) {
            if let Some(amount) = row.books_amount {
                books.push(CheckCandidate { idx, key: digits_key(&row.ref2), cents: to_cents(amount.abs()) });
            }
        }
    }

    let tolerance = to_cents(cfg.tolerance);
    let mut used = vec![false; books.len()];
    let mut tagged = 0;

    for b in &bank {
        let hit = books.iter().enumerate().find(|(i, a)| {
            !used[*i] && a.key == b.key && (a.cents - b.cents).abs() <= tolerance
        });
        if let Some((i, a)) = hit {
            used[i] = true;
            tagged += usize::from(state.claim(b.idx, rule));
            tagged += usize::from(state.claim(a.idx, rule));
        }
    }
    tagged
}

// ---------------------------------------------------------------------------
// Rule 11
// ---------------------------------------------------------------------------

fn is_residual_bank(row: &NormalizedRow, cfg: &ResidualTransferConfig) -> bool {
    row.code == Some(cfg.code) && row.bank_amount.is_some_and(|a| a != 0.0)
}

fn is_residual_books(row: &NormalizedRow, cfg: &ResidualTransferConfig) -> bool {
    row.books_amount.is_some_and(|a| a != 0.0) && row.ref1_has_prefix(&cfg.book_prefix)
}

/// Bucket both sides by |amount| and pair positionally up to the smaller side.
/// Returns rows tagged.
pub fn match_residual_transfers(
    state: &mut MatchState,
    cfg: &ResidualTransferConfig,
    rule: RuleId,
) -> usize {
    let mut bank = OrderedGroups::new();
    let mut books = OrderedGroups::new();

    for (idx, row) in state.unmatched() {
        if is_residual_bank(row, cfg) {
            if let Some(amount) = row.bank_amount {
                bank.push(amount_key(amount), idx);
            }
        } else if is_residual_books(row, cfg) {
            if let Some(amount) = row.books_amount {
                books.push(amount_key(amount), idx);
            }
        }
    }

    let pairs: Vec<(usize, usize)> = bank
        .iter()
        .flat_map(|(key, bank_idx)| {
            bank_idx.iter().copied().zip(books.get(key).iter().copied()).collect::<Vec<_>>()
        })
        .collect();

    let mut tagged = 0;
    for (b, a) in pairs {
        tagged += usize::from(state.claim(b, rule));
        tagged += usize::from(state.claim(a, rule));
    }
    tagged
}
