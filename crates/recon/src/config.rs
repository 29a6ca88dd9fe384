use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Number of fixed-phrase rules (7, 8, 9).
pub const PHRASE_RULE_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Rule constants and column aliases for one run.
///
/// Every table is optional in TOML; missing tables and fields fall back to the
/// built-in defaults, so a user file only lists what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub columns: ColumnAliases,
    pub aux_columns: AuxColumnAliases,
    pub cross_match: CrossMatchConfig,
    pub standing_orders: CodeSetConfig,
    pub transfers: TransferConfig,
    pub checks: CheckConfig,
    pub small_amounts: SmallAmountConfig,
    pub counterparty: CounterpartyConfig,
    pub phrase_rules: Vec<PhraseRule>,
    pub nonzero_codes: CodeSetConfig,
    pub residual_transfers: ResidualTransferConfig,
    pub ledger: LedgerConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            columns: ColumnAliases::default(),
            aux_columns: AuxColumnAliases::default(),
            cross_match: CrossMatchConfig::default(),
            standing_orders: CodeSetConfig { codes: vec![469, 515] },
            transfers: TransferConfig::default(),
            checks: CheckConfig::default(),
            small_amounts: SmallAmountConfig::default(),
            counterparty: CounterpartyConfig::default(),
            phrase_rules: vec![
                PhraseRule { code: 143, phrase: "שיקים ממשמרת".into() },
                PhraseRule { code: 191, phrase: "הפק' שיק-שידור".into() },
                PhraseRule { code: 205, phrase: "הפק.שיק במכונה".into() },
            ],
            nonzero_codes: CodeSetConfig { codes: vec![191, 132, 396] },
            residual_transfers: ResidualTransferConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

/// Accepted header names per canonical field, in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub match_tag: Vec<String>,
    pub code: Vec<String>,
    pub bank_amount: Vec<String>,
    pub books_amount: Vec<String>,
    pub ref1: Vec<String>,
    pub ref2: Vec<String>,
    pub date: Vec<String>,
    pub details: Vec<String>,
    /// Header appended when no match column exists.
    pub match_column_name: String,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            match_tag: strings(&["מס.התאמה", "מס. התאמה", "מס התאמה", "מספר התאמה", "התאמה"]),
            code: strings(&["קוד פעולת בנק", "קוד פעולה", "קוד פעולת", "Bank Code"]),
            bank_amount: strings(&["סכום בדף", "סכום דף", "סכום בבנק", "סכום תנועת בנק", "Bank Amount"]),
            books_amount: strings(&["סכום בספרים", "סכום בספר", "סכום ספרים", "Books Amount"]),
            ref1: strings(&["אסמכתא 1", "אסמכתא1", "אסמכתא", "אסמכתה", "Ref1"]),
            ref2: strings(&["אסמכתא 2", "אסמכתא2", "אסמכתא-2", "אסמכתה 2", "Ref2"]),
            date: strings(&["תאריך מאזן", "תאריך ערך", "תאריך", "Date"]),
            details: strings(&["פרטים", "תיאור", "שם ספק", "Details", "תאור"]),
            match_column_name: "התאמה".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuxColumnAliases {
    pub date: Vec<String>,
    pub amount: Vec<String>,
    pub payment_ref: Vec<String>,
}

impl Default for AuxColumnAliases {
    fn default() -> Self {
        Self {
            date: strings(&["תאריך פריקה", "תאריך", "פריקה"]),
            amount: strings(&["אחרי ניכוי", "אחרי", "סכום"]),
            payment_ref: strings(&["מס' תשלום", "מס תשלום", "מספר תשלום"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule sections
// ---------------------------------------------------------------------------

/// Rule 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossMatchConfig {
    pub codes: Vec<i64>,
    pub book_prefixes: Vec<String>,
}

impl Default for CrossMatchConfig {
    fn default() -> Self {
        Self {
            codes: vec![120, 175],
            book_prefixes: strings(&["OV", "RC"]),
        }
    }
}

/// Plain code set, used by rule 2 (standing orders) and rule 10.
/// A table given in TOML must list `codes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSetConfig {
    pub codes: Vec<i64>,
}

impl CodeSetConfig {
    pub fn contains(&self, code: Option<i64>) -> bool {
        code.is_some_and(|c| self.codes.contains(&c))
    }
}

/// Rule 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub code: i64,
    pub phrase: String,
    pub epsilon: f64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            code: 485,
            phrase: "העב' במקבץ-נט".into(),
            epsilon: 0.0,
        }
    }
}

/// Rule 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub code: i64,
    pub book_prefix: String,
    pub tolerance: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            code: 493,
            book_prefix: "CH".into(),
            tolerance: 0.50,
        }
    }
}

/// Rule 5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmallAmountConfig {
    pub codes: Vec<i64>,
    pub ceiling: f64,
}

impl Default for SmallAmountConfig {
    fn default() -> Self {
        Self {
            codes: vec![453, 472, 473, 124],
            ceiling: 1000.0,
        }
    }
}

/// Rule 6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterpartyConfig {
    pub code: i64,
    pub name: String,
}

impl Default for CounterpartyConfig {
    fn default() -> Self {
        Self {
            code: 175,
            name: "פאיימי בע\"מ".into(),
        }
    }
}

/// Rules 7–9: debit with a fixed operation code and an exact details phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseRule {
    pub code: i64,
    pub phrase: String,
}

/// Rule 11.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidualTransferConfig {
    pub code: i64,
    pub book_prefix: String,
}

impl Default for ResidualTransferConfig {
    fn default() -> Self {
        Self {
            code: 485,
            book_prefix: "BT".into(),
        }
    }
}

/// Supplier ledger totals line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub totals_supplier: String,
    pub totals_label: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            totals_supplier: "20001".into(),
            totals_label: "סה\"כ זכות – עם מס' ספק".into(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    /// Parse a TOML rule file. Tables and fields it omits keep their defaults.
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        check_amount("transfers.epsilon", self.transfers.epsilon)?;
        check_amount("checks.tolerance", self.checks.tolerance)?;
        check_amount("small_amounts.ceiling", self.small_amounts.ceiling)?;
        if self.small_amounts.ceiling <= 0.0 {
            return Err(ReconError::ConfigValidation(
                "small_amounts.ceiling must be positive".into(),
            ));
        }

        if self.phrase_rules.len() != PHRASE_RULE_COUNT {
            return Err(ReconError::PhraseRuleCount {
                expected: PHRASE_RULE_COUNT,
                found: self.phrase_rules.len(),
            });
        }

        let prefixes = self
            .cross_match
            .book_prefixes
            .iter()
            .chain([&self.checks.book_prefix, &self.residual_transfers.book_prefix]);
        for prefix in prefixes {
            if prefix.trim().is_empty() {
                return Err(ReconError::ConfigValidation("book prefixes must not be empty".into()));
            }
        }

        let code_sets = [
            ("cross_match.codes", &self.cross_match.codes),
            ("standing_orders.codes", &self.standing_orders.codes),
            ("small_amounts.codes", &self.small_amounts.codes),
            ("nonzero_codes.codes", &self.nonzero_codes.codes),
        ];
        for (name, codes) in code_sets {
            if codes.is_empty() {
                return Err(ReconError::ConfigValidation(format!("{name} must not be empty")));
            }
        }

        if self.cross_match.book_prefixes.is_empty() {
            return Err(ReconError::ConfigValidation(
                "cross_match.book_prefixes must not be empty".into(),
            ));
        }

        Ok(())
    }
}

fn check_amount(name: &str, value: f64) -> Result<(), ReconError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ReconError::ConfigValidation(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
