use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::stats::MatchStats;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single spreadsheet cell as handed over by the tabular layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Self::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Date(_) => serializer.collect_str(self),
        }
    }
}

/// Header-driven dataset. Rows are positionally aligned to `headers`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, col); missing cells read as `Empty`.
    pub fn cell(&self, row: usize, col: Option<usize>) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        match col {
            Some(c) => self.rows.get(row).and_then(|r| r.get(c)).unwrap_or(&EMPTY),
            None => &EMPTY,
        }
    }
}

/// Everything the engine needs for one run.
pub struct ReconInput {
    pub primary: Table,
    pub auxiliary: Option<Table>,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Rule number 1..=11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u8);

impl RuleId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 11;

    pub fn new(n: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&n).then_some(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub(crate) const fn of(n: u8) -> Self {
        Self(n)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchTag {
    Unmatched,
    Rule(RuleId),
    /// Foreign value found in the match column before the run. Never touched by rules.
    Preset(String),
}

impl MatchTag {
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Self::Unmatched)
    }

    /// Numeric tag 0..=11, `None` for presets.
    pub fn number(&self) -> Option<u8> {
        match self {
            Self::Unmatched => Some(0),
            Self::Rule(id) => Some(id.get()),
            Self::Preset(_) => None,
        }
    }
}

impl Serialize for MatchTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unmatched => serializer.serialize_u8(0),
            Self::Rule(id) => serializer.serialize_u8(id.get()),
            Self::Preset(s) => serializer.serialize_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Diagnostic for a rule-3 event that could not be reconciled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub event_date: String,
    pub aux_sum: f64,
    #[serde(serialize_with = "amount_or_na")]
    pub books_sum: Option<f64>,
    #[serde(serialize_with = "amount_or_na")]
    pub gap: Option<f64>,
    pub bank_count: usize,
    pub books_count: usize,
}

fn amount_or_na<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str("N/A"),
    }
}

/// One line of the standing-order supplier ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRecord {
    pub details: String,
    pub amount: Option<f64>,
    pub supplier_id: String,
    pub debit: f64,
    pub credit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub rows: usize,
    pub has_auxiliary: bool,
}

/// Result bundle of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    /// Original table with the match column written.
    pub table: Table,
    pub match_column: usize,
    pub tags: Vec<MatchTag>,
    pub stats: MatchStats,
    pub supplier_ledger: Vec<LedgerRecord>,
    pub rule3_gaps: Vec<GapReport>,
}
