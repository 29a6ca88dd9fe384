//! Cell normalization: amounts, operation codes, dates, text.
//!
//! Nothing in here fails. Unparseable amounts become `None`, which fails every
//! numeric predicate downstream; unparseable dates fall back to their raw text.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::model::{CellValue, MatchTag, RuleId, Table};
use crate::schema::PrimaryColumns;

/// Characters removed before parsing an amount: thousands separator, shekel
/// sign, and the RTL/LTR marks spreadsheets carry around Hebrew text.
const AMOUNT_NOISE: [char; 4] = [',', '₪', '\u{200f}', '\u{200e}'];

const TEXT_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d"];
const TEXT_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a cell as a decimal amount. `None` is the not-a-number sentinel.
pub fn parse_amount(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => {
            let cleaned: String = s.chars().filter(|c| !AMOUNT_NOISE.contains(c)).collect();
            cleaned.trim().parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Operation code: an integral amount.
pub fn parse_code(cell: &CellValue) -> Option<i64> {
    parse_amount(cell).filter(|n| n.fract() == 0.0).map(|n| n as i64)
}

/// Whole cents. All amount comparisons go through this.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Round to two decimals.
pub fn round2(amount: f64) -> f64 {
    to_cents(amount) as f64 / 100.0
}

/// Grouping key for an absolute amount, e.g. `-100` -> `"100.00"`.
pub fn amount_key(amount: f64) -> String {
    format!("{:.2}", round2(amount.abs()))
}

/// Convert a spreadsheet date serial (1900 date system) to a timestamp.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    // Serial 60 is the phantom 1900-02-29; only later serials shift back a day.
    let epoch_day = if days < 60 { 31 } else { 30 };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, epoch_day)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Normalize a date-bearing cell to `YYYY-MM-DD`, or the trimmed raw text when it
/// is not recognizable as a date. Empty cells give `""`.
pub fn normalize_date(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Date(dt) => dt.format("%Y-%m-%d").to_string(),
        CellValue::Number(n) => match serial_to_datetime(*n) {
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => cell.to_string(),
        },
        CellValue::Bool(_) => cell.to_string(),
        CellValue::Text(s) => {
            let s = s.trim();
            parse_text_date(s)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| s.to_string())
        }
    }
}

pub fn parse_text_date(s: &str) -> Option<NaiveDate> {
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            TEXT_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Text form of a cell for references and free-text details.
pub fn cell_text(cell: &CellValue) -> String {
    cell.to_string()
}

/// Initial tag from a pre-existing match cell.
pub fn initial_tag(cell: &CellValue) -> MatchTag {
    if cell.is_empty() {
        return MatchTag::Unmatched;
    }
    match parse_code(cell) {
        Some(0) => MatchTag::Unmatched,
        Some(n) => match u8::try_from(n).ok().and_then(RuleId::new) {
            Some(id) => MatchTag::Rule(id),
            None => MatchTag::Preset(cell.to_string()),
        },
        None => MatchTag::Preset(cell.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Normalized rows
// ---------------------------------------------------------------------------

/// Canonical view of one primary row, as the rules see it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub tag: MatchTag,
    pub code: Option<i64>,
    pub bank_amount: Option<f64>,
    pub books_amount: Option<f64>,
    pub ref1: String,
    pub ref2: String,
    pub date: String,
    pub details: String,
}

impl NormalizedRow {
    pub fn from_table(table: &Table, row: usize, cols: &PrimaryColumns) -> Self {
        Self {
            tag: initial_tag(table.cell(row, cols.match_tag)),
            code: parse_code(table.cell(row, cols.code)),
            bank_amount: parse_amount(table.cell(row, cols.bank_amount)),
            books_amount: parse_amount(table.cell(row, cols.books_amount)),
            ref1: cell_text(table.cell(row, cols.ref1)),
            ref2: cell_text(table.cell(row, cols.ref2)),
            date: normalize_date(table.cell(row, cols.date)),
            details: cell_text(table.cell(row, cols.details)),
        }
    }

    /// Trimmed ref1 starts with `prefix`, ASCII case-insensitive.
    pub fn ref1_has_prefix(&self, prefix: &str) -> bool {
        let ref1 = self.ref1.trim();
        ref1.len() >= prefix.len()
            && ref1.is_char_boundary(prefix.len())
            && ref1[..prefix.len()].eq_ignore_ascii_case(prefix)
    }
}

pub fn normalize_rows(table: &Table, cols: &PrimaryColumns) -> Vec<NormalizedRow> {
    (0..table.len()).map(|i| NormalizedRow::from_table(table, i, cols)).collect()
}
