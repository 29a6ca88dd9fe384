//! Rule 3: aggregated transfer batches from the auxiliary dataset.
//!
//! Auxiliary rows are grouped into one event per normalized date. An event is
//! closed when the statement carries at least one matching transfer line and
//! the books rows referenced by the event's payment numbers sum to the event
//! total within `transfers.epsilon`. Everything else is reported as a gap.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::config::TransferConfig;
use crate::model::{GapReport, RuleId, Table};
use crate::normalize::{cell_text, normalize_date, parse_amount, round2, to_cents};
use crate::schema::AuxColumns;
use crate::state::MatchState;

/// Auxiliary rows sharing one date.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxEvent {
    pub date: String,
    pub sum: f64,
    pub payment_refs: BTreeSet<String>,
}

/// Group auxiliary rows by date, in first-appearance order.
///
/// Rows with an empty date or an unparseable amount are skipped. Without a
/// resolvable date and amount column there are no events.
pub fn build_events(table: &Table, cols: &AuxColumns) -> Vec<AuxEvent> {
    let (Some(_), Some(_)) = (cols.date, cols.amount) else {
        debug!(rows = table.len(), "auxiliary date/amount columns unresolved; no events");
        return Vec::new();
    };

    let mut events: Vec<AuxEvent> = Vec::new();
    let mut by_date: HashMap<String, usize> = HashMap::new();

    for row in 0..table.len() {
        let date = normalize_date(table.cell(row, cols.date));
        if date.is_empty() {
            continue;
        }
        let Some(amount) = parse_amount(table.cell(row, cols.amount)) else {
            continue;
        };

        let slot = *by_date.entry(date.clone()).or_insert_with(|| {
            events.push(AuxEvent { date, sum: 0.0, payment_refs: BTreeSet::new() });
            events.len() - 1
        });
        let event = &mut events[slot];
        event.sum += amount;

        let payment_ref = cell_text(table.cell(row, cols.payment_ref));
        let payment_ref = payment_ref.trim();
        if !payment_ref.is_empty() {
            event.payment_refs.insert(payment_ref.to_string());
        }
    }
    events
}

/// Apply rule 3 over every event. Returns rows tagged and one gap report per
/// unresolved event.
///
/// `books_resolved` is false when the primary dataset lacks the ref1 or books
/// amount column; no row can then be a books candidate.
pub fn match_transfers(
    state: &mut MatchState,
    events: &[AuxEvent],
    cfg: &TransferConfig,
    books_resolved: bool,
    rule: RuleId,
) -> (usize, Vec<GapReport>) {
    let epsilon = to_cents(cfg.epsilon);
    let mut tagged = 0;
    let mut gaps = Vec::new();

    for event in events {
        let event_cents = to_cents(event.sum).abs();

        let mut books = Vec::new();
        let mut books_sum = 0.0;
        if books_resolved && !event.payment_refs.is_empty() {
            for (idx, row) in state.unmatched() {
                if event.payment_refs.contains(row.ref1.trim()) {
                    books.push(idx);
                    books_sum += row.books_amount.unwrap_or(0.0);
                }
            }
        }

        let bank: Vec<usize> = state
            .unmatched()
            .filter(|(_, row)| {
                row.code == Some(cfg.code)
                    && row.details.contains(&cfg.phrase)
                    && row.bank_amount.is_some_and(|a| {
                        a > 0.0 && (to_cents(a.abs()) - event_cents).abs() <= epsilon
                    })
            })
            .map(|(idx, _)| idx)
            .collect();

        let books_cents = to_cents(books_sum).abs();
        let gap_cents = (books_cents - event_cents).abs();

        if !bank.is_empty() && !books.is_empty() && gap_cents <= epsilon {
            let closed = state.claim_all(&bank, rule) + state.claim_all(&books, rule);
            debug!(date = %event.date, bank = bank.len(), books = books.len(), "transfer batch closed");
            tagged += closed;
            continue;
        }

        // The gap is only meaningful when both sides have candidates.
        let has_books = !books.is_empty();
        let report = GapReport {
            event_date: event.date.clone(),
            aux_sum: round2(event.sum),
            books_sum: has_books.then(|| round2(books_sum)),
            gap: (has_books && !bank.is_empty()).then(|| gap_cents as f64 / 100.0),
            bank_count: bank.len(),
            books_count: books.len(),
        };
        debug!(
            date = %report.event_date,
            aux_sum = report.aux_sum,
            bank = report.bank_count,
            books = report.books_count,
            "transfer batch gap"
        );
        gaps.push(report);
    }

    (tagged, gaps)
}
