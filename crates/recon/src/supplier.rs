use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::model::{LedgerRecord, MatchTag, RuleId};
use crate::normalize::{amount_key, round2, NormalizedRow};

/// One details-substring to supplier-id mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMapping {
    pub pattern: String,
    pub supplier: String,
}

/// Counterparty lookup for standing-order rows.
///
/// `names` is scanned in order and the first pattern contained in the row's
/// details wins; `amounts` is keyed by the absolute amount formatted to two
/// decimals and is only consulted when no name matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierConfig {
    #[serde(default)]
    pub names: Vec<NameMapping>,
    #[serde(default)]
    pub amounts: BTreeMap<String, String>,
}

impl SupplierConfig {
    pub fn resolve(&self, details: &str, amount: Option<f64>) -> Option<&str> {
        self.names
            .iter()
            .find(|m| !m.pattern.is_empty() && details.contains(&m.pattern))
            .map(|m| m.supplier.as_str())
            .or_else(|| {
                let key = amount_key(amount?);
                self.amounts.get(&key).map(String::as_str)
            })
    }
}

/// Build the standing-order ledger from rows tagged 2, plus a totals line when
/// at least one row resolved to a supplier.
pub fn build_supplier_ledger(
    rows: &[NormalizedRow],
    suppliers: &SupplierConfig,
    ledger: &LedgerConfig,
) -> Vec<LedgerRecord> {
    let standing = MatchTag::Rule(RuleId::of(2));
    let mut records = Vec::new();
    let mut total = 0.0;

    for row in rows.iter().filter(|r| r.tag == standing) {
        let supplier_id = suppliers.resolve(&row.details, row.bank_amount).unwrap_or_default().to_string();
        let debit = row.bank_amount.map_or(0.0, f64::abs);
        if !supplier_id.is_empty() {
            total += debit;
        }
        records.push(LedgerRecord {
            details: row.details.clone(),
            amount: row.bank_amount,
            supplier_id,
            debit,
            credit: 0.0,
        });
    }

    if total > 0.0 {
        records.push(LedgerRecord {
            details: ledger.totals_label.clone(),
            amount: Some(0.0),
            supplier_id: ledger.totals_supplier.clone(),
            debit: 0.0,
            credit: round2(total),
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suppliers() -> SupplierConfig {
        SupplierConfig {
            names: vec![
                NameMapping { pattern: "חברת חשמל".into(), supplier: "30001".into() },
                NameMapping { pattern: "חשמל".into(), supplier: "30002".into() },
                NameMapping { pattern: String::new(), supplier: "99999".into() },
            ],
            amounts: BTreeMap::from([("120.00".into(), "40001".into())]),
        }
    }

    fn standing(details: &str, amount: Option<f64>) -> NormalizedRow {
        NormalizedRow {
            tag: MatchTag::Rule(RuleId::of(2)),
            code: Some(469),
            bank_amount: amount,
            books_amount: None,
            ref1: String::new(),
            ref2: String::new(),
            date: String::new(),
            details: details.into(),
        }
    }

    #[test]
    fn first_name_match_wins() {
        let s = suppliers();
        assert_eq!(s.resolve("הו\"ק חברת חשמל", Some(-1.0)), Some("30001"));
        assert_eq!(s.resolve("חשמל ירושלים", Some(-1.0)), Some("30002"));
    }

    #[test]
    fn name_beats_amount_then_amount_fallback() {
        let s = suppliers();
        assert_eq!(s.resolve("חשמל", Some(-120.0)), Some("30002"));
        assert_eq!(s.resolve("ארנונה", Some(-120.0)), Some("40001"));
        assert_eq!(s.resolve("ארנונה", None), None);
        assert_eq!(s.resolve("ארנונה", Some(-5.0)), None);
    }

    #[test]
    fn ledger_with_totals() {
        let rows = vec![
            standing("חשמל", Some(-100.5)),
            standing("ארנונה", Some(-120.0)),
            standing("לא ידוע", Some(-7.0)),
            NormalizedRow { tag: MatchTag::Unmatched, ..standing("חשמל", Some(-1.0)) },
        ];
        let ledger = build_supplier_ledger(&rows, &suppliers(), &LedgerConfig::default());
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger[0].supplier_id, "30002");
        assert_eq!(ledger[1].supplier_id, "40001");
        assert_eq!(ledger[2].supplier_id, "");
        assert_eq!(ledger[2].debit, 7.0);
        let totals = &ledger[3];
        assert_eq!(totals.supplier_id, "20001");
        assert_eq!(totals.debit, 0.0);
        assert_eq!(totals.credit, 220.5);
    }

    #[test]
    fn no_totals_when_nothing_resolves() {
        let rows = vec![standing("לא ידוע", Some(-7.0)), standing("x", None)];
        let ledger = build_supplier_ledger(&rows, &suppliers(), &LedgerConfig::default());
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[1].amount, None);
        assert_eq!(ledger[1].debit, 0.0);
    }

    #[test]
    fn config_json_shape() {
        let json = r#"{"names":[{"pattern":"חשמל","supplier":"1"}],"amounts":{"5.00":"2"}}"#;
        let cfg: SupplierConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.names[0].supplier, "1");
        assert_eq!(cfg.amounts["5.00"], "2");
        let empty: SupplierConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, SupplierConfig::default());
    }
}
