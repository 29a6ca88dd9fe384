//! Single-row classification rules: 2 and 5–10.
//!
//! Each rule is a predicate over one normalized row. Rules run in order, so a
//! row is tagged by the first predicate it satisfies.

use crate::config::{CodeSetConfig, CounterpartyConfig, PhraseRule, SmallAmountConfig};
use crate::model::RuleId;
use crate::normalize::{to_cents, NormalizedRow};
use crate::state::MatchState;

/// Tag every unmatched row satisfying `pred`. Returns rows tagged.
pub fn classify(state: &mut MatchState, rule: RuleId, pred: impl Fn(&NormalizedRow) -> bool) -> usize {
    let hits: Vec<usize> = state.unmatched().filter(|(_, row)| pred(row)).map(|(idx, _)| idx).collect();
    state.claim_all(&hits, rule)
}

/// Rule 2: standing-order debit.
pub fn is_standing_order(row: &NormalizedRow, cfg: &CodeSetConfig) -> bool {
    cfg.contains(row.code)
}

/// Rule 5: small credit, `0 < amount <= ceiling`.
pub fn is_small_amount(row: &NormalizedRow, cfg: &SmallAmountConfig) -> bool {
    row.code.is_some_and(|c| cfg.codes.contains(&c))
        && row.bank_amount.is_some_and(|a| a > 0.0 && to_cents(a) <= to_cents(cfg.ceiling))
}

/// Rule 6: fixed counterparty debit, matched on exact details.
pub fn is_counterparty_debit(row: &NormalizedRow, cfg: &CounterpartyConfig) -> bool {
    row.code == Some(cfg.code)
        && row.bank_amount.is_some_and(|a| a < 0.0)
        && row.details == cfg.name
}

/// Rules 7–9: debit with a fixed code and exact details phrase.
pub fn is_phrase_debit(row: &NormalizedRow, rule: &PhraseRule) -> bool {
    row.code == Some(rule.code)
        && row.bank_amount.is_some_and(|a| a < 0.0)
        && row.details == rule.phrase
}

/// Rule 10: listed code with any non-zero bank amount.
pub fn is_nonzero_code(row: &NormalizedRow, cfg: &CodeSetConfig) -> bool {
    cfg.contains(row.code) && row.bank_amount.is_some_and(|a| a != 0.0)
}
