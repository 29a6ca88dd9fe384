use tracing::{debug, info};

use crate::aggregate::{build_events, match_transfers, AuxEvent};
use crate::classify::{
    classify, is_counterparty_debit, is_nonzero_code, is_phrase_debit, is_small_amount, is_standing_order,
};
use crate::config::ReconConfig;
use crate::matcher::{match_checks, match_residual_transfers, match_unique_amount_date};
use crate::model::{CellValue, GapReport, MatchTag, ReconInput, ReconMeta, ReconResult, RuleId, Table};
use crate::normalize::normalize_rows;
use crate::schema::{AuxColumns, PrimaryColumns};
use crate::state::MatchState;
use crate::stats::MatchStats;
use crate::supplier::{build_supplier_ledger, SupplierConfig};

// ---------------------------------------------------------------------------
// Rule pipeline
// ---------------------------------------------------------------------------

/// The eleven matching rules, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    UniqueAmountDate,
    StandingOrder,
    TransferBatch,
    CheckClearing,
    SmallAmount,
    Counterparty,
    /// Index into `ReconConfig::phrase_rules`.
    FixedPhrase(usize),
    NonzeroCode,
    ResidualTransfer,
}

impl Rule {
    pub const ALL: [Rule; 11] = [
        Rule::UniqueAmountDate,
        Rule::StandingOrder,
        Rule::TransferBatch,
        Rule::CheckClearing,
        Rule::SmallAmount,
        Rule::Counterparty,
        Rule::FixedPhrase(0),
        Rule::FixedPhrase(1),
        Rule::FixedPhrase(2),
        Rule::NonzeroCode,
        Rule::ResidualTransfer,
    ];

    pub fn id(self) -> RuleId {
        RuleId::of(match self {
            Rule::UniqueAmountDate => 1,
            Rule::StandingOrder => 2,
            Rule::TransferBatch => 3,
            Rule::CheckClearing => 4,
            Rule::SmallAmount => 5,
            Rule::Counterparty => 6,
            Rule::FixedPhrase(i) => 7 + i as u8,
            Rule::NonzeroCode => 10,
            Rule::ResidualTransfer => 11,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Rule::UniqueAmountDate => "unique_amount_date",
            Rule::StandingOrder => "standing_order",
            Rule::TransferBatch => "transfer_batch",
            Rule::CheckClearing => "check_clearing",
            Rule::SmallAmount => "small_amount",
            Rule::Counterparty => "counterparty",
            Rule::FixedPhrase(_) => "fixed_phrase",
            Rule::NonzeroCode => "nonzero_code",
            Rule::ResidualTransfer => "residual_transfer",
        }
    }

    /// Run this rule against the current state. Only unmatched rows are
    /// considered; each tagged row moves from 0 to `self.id()`.
    pub fn apply(self, state: &mut MatchState, ctx: &RuleContext<'_>) -> RuleOutcome {
        let cfg = ctx.config;
        let id = self.id();
        let tagged = match self {
            Rule::UniqueAmountDate => match_unique_amount_date(state, &cfg.cross_match, id),
            Rule::StandingOrder => classify(state, id, |r| is_standing_order(r, &cfg.standing_orders)),
            Rule::TransferBatch => {
                let Some(events) = ctx.events else {
                    return RuleOutcome::default();
                };
                let (tagged, gaps) = match_transfers(state, events, &cfg.transfers, ctx.books_resolved, id);
                return RuleOutcome { tagged, gaps };
            }
            Rule::CheckClearing => match_checks(state, &cfg.checks, id),
            Rule::SmallAmount => classify(state, id, |r| is_small_amount(r, &cfg.small_amounts)),
            Rule::Counterparty => classify(state, id, |r| is_counterparty_debit(r, &cfg.counterparty)),
            Rule::FixedPhrase(i) => match cfg.phrase_rules.get(i) {
                Some(phrase) => classify(state, id, |r| is_phrase_debit(r, phrase)),
                None => 0,
            },
            Rule::NonzeroCode => classify(state, id, |r| is_nonzero_code(r, &cfg.nonzero_codes)),
            Rule::ResidualTransfer => match_residual_transfers(state, &cfg.residual_transfers, id),
        };
        RuleOutcome { tagged, gaps: Vec::new() }
    }
}

/// Read-only inputs shared by every rule.
pub struct RuleContext<'a> {
    pub config: &'a ReconConfig,
    /// Auxiliary events; `None` when no auxiliary dataset was supplied.
    pub events: Option<&'a [AuxEvent]>,
    /// Both ref1 and books amount columns resolved in the primary dataset.
    pub books_resolved: bool,
}

#[derive(Debug, Default)]
pub struct RuleOutcome {
    pub tagged: usize,
    pub gaps: Vec<GapReport>,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the full pipeline over one dataset.
///
/// Never fails on data: unresolved columns and unparseable cells make the
/// affected rules find no candidates. `config` is assumed validated.
pub fn run(config: &ReconConfig, suppliers: &SupplierConfig, input: ReconInput) -> ReconResult {
    let ReconInput { mut primary, auxiliary } = input;

    let cols = PrimaryColumns::resolve(&primary.headers, &config.columns);
    let unresolved = cols.unresolved();
    if !unresolved.is_empty() {
        debug!(fields = ?unresolved, "primary columns unresolved");
    }

    let events = auxiliary.as_ref().map(|aux| {
        let aux_cols = AuxColumns::resolve(&aux.headers, &config.aux_columns);
        build_events(aux, &aux_cols)
    });

    let mut state = MatchState::new(normalize_rows(&primary, &cols));
    let ctx = RuleContext {
        config,
        events: events.as_deref(),
        books_resolved: cols.ref1.is_some() && cols.books_amount.is_some(),
    };
    let mut rule3_gaps = Vec::new();

    for rule in Rule::ALL {
        let outcome = rule.apply(&mut state, &ctx);
        debug!(rule = %rule.id(), name = rule.name(), tagged = outcome.tagged, "rule applied");
        rule3_gaps.extend(outcome.gaps);
    }

    let supplier_ledger = build_supplier_ledger(state.rows(), suppliers, &config.ledger);
    let tags = state.into_tags();
    let stats = MatchStats::from_tags(&tags);
    let match_column = write_match_column(&mut primary, cols.match_tag, &config.columns.match_column_name, &tags);

    info!(
        rows = tags.len(),
        matched = stats.matched(),
        unmatched = stats.unmatched(),
        preset = stats.preset,
        gaps = rule3_gaps.len(),
        "reconciliation finished"
    );

    ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            rows: tags.len(),
            has_auxiliary: auxiliary.is_some(),
        },
        table: primary,
        match_column,
        tags,
        stats,
        supplier_ledger,
        rule3_gaps,
    }
}

/// Write numeric tags into the match column, appending the column when the
/// dataset has none. Preset cells are left as they were. Returns the column index.
fn write_match_column(table: &mut Table, existing: Option<usize>, header: &str, tags: &[MatchTag]) -> usize {
    let col = existing.unwrap_or_else(|| {
        table.headers.push(header.to_string());
        table.headers.len() - 1
    });

    for (row, tag) in table.rows.iter_mut().zip(tags) {
        let Some(n) = tag.number() else {
            continue;
        };
        if row.len() <= col {
            row.resize(col + 1, CellValue::Empty);
        }
        row[col] = CellValue::Number(f64::from(n));
    }
    col
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    #[test]
    fn rule_order_and_ids() {
        let ids: Vec<u8> = Rule::ALL.iter().map(|r| r.id().get()).collect();
        assert_eq!(ids, (1..=11).collect::<Vec<u8>>());
    }

    #[test]
    fn appends_match_column_when_missing() {
        let input = ReconInput {
            primary: table(&["Bank Code", "Bank Amount"], vec![vec![n(469.0), n(-10.0)], vec![n(1.0)]]),
            auxiliary: None,
        };
        let result = run(&ReconConfig::default(), &SupplierConfig::default(), input);
        assert_eq!(result.match_column, 2);
        assert_eq!(result.table.headers[2], "התאמה");
        assert_eq!(result.table.rows[0][2], n(2.0));
        assert_eq!(result.table.rows[1].len(), 3);
        assert_eq!(result.table.rows[1][2], n(0.0));
        assert!(!result.meta.has_auxiliary);
    }

    #[test]
    fn preset_tags_survive() {
        let input = ReconInput {
            primary: table(
                &["מס.התאמה", "קוד פעולה", "סכום בדף"],
                vec![
                    vec![t("ידני"), n(469.0), n(-10.0)],
                    vec![n(5.0), n(469.0), n(-10.0)],
                    vec![CellValue::Empty, n(469.0), n(-10.0)],
                ],
            ),
            auxiliary: None,
        };
        let result = run(&ReconConfig::default(), &SupplierConfig::default(), input);
        assert_eq!(result.match_column, 0);
        assert_eq!(result.tags[0], MatchTag::Preset("ידני".into()));
        assert_eq!(result.table.rows[0][0], t("ידני"));
        assert_eq!(result.tags[1], MatchTag::Rule(RuleId::of(5)));
        assert_eq!(result.tags[2], MatchTag::Rule(RuleId::of(2)));
        assert_eq!(result.stats.preset, 1);
        assert_eq!(result.stats.count(5), 1);
    }

    #[test]
    fn empty_dataset_reports_zero_stats() {
        let input = ReconInput { primary: Table::new(vec![]), auxiliary: None };
        let result = run(&ReconConfig::default(), &SupplierConfig::default(), input);
        assert!(result.tags.is_empty());
        assert_eq!(result.stats.by_tag.len(), 12);
        assert_eq!(result.stats.total(), 0);
        assert!(result.rule3_gaps.is_empty());
        assert!(result.supplier_ledger.is_empty());
    }

    #[test]
    fn rule3_without_auxiliary_is_skipped() {
        let input = ReconInput {
            primary: table(
                &["Bank Code", "Bank Amount", "Details"],
                vec![vec![n(485.0), n(100.0), t("העב' במקבץ-נט")]],
            ),
            auxiliary: None,
        };
        let result = run(&ReconConfig::default(), &SupplierConfig::default(), input);
        assert!(result.rule3_gaps.is_empty());
        assert_eq!(result.tags[0], MatchTag::Unmatched);
    }

    #[test]
    fn earlier_rule_wins() {
        // Code 191 with the rule-8 phrase and a debit fits rules 8 and 10.
        let input = ReconInput {
            primary: table(
                &["Bank Code", "Bank Amount", "Details"],
                vec![
                    vec![n(191.0), n(-30.0), t("הפק' שיק-שידור")],
                    vec![n(191.0), n(-30.0), t("אחר")],
                ],
            ),
            auxiliary: None,
        };
        let result = run(&ReconConfig::default(), &SupplierConfig::default(), input);
        assert_eq!(result.tags[0], MatchTag::Rule(RuleId::of(8)));
        assert_eq!(result.tags[1], MatchTag::Rule(RuleId::of(10)));
    }
}
