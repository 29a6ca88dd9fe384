// Excel import (xlsx, xls, xlsb, ods) and result workbook export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use ledgermatch_recon::model::{CellValue, GapReport, LedgerRecord, ReconResult, Table};
use ledgermatch_recon::normalize::serial_to_datetime;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::error::IoError;
use crate::table::table_from_grid;

pub const DATA_SHEET: &str = "DataSheet";
pub const SUMMARY_SHEET: &str = "סיכום";
pub const LEDGER_SHEET: &str = "הוראת קבע ספקים";
pub const GAPS_SHEET: &str = "פערי סכומים – כלל 3";
pub const TEMPLATE_SHEET: &str = "ספקים";

const SUMMARY_HEADERS: [&str; 2] = ["מס", "כמות"];
const LEDGER_HEADERS: [&str; 5] = ["פרטים", "סכום", "מס' ספק", "סכום חובה", "סכום זכות"];
const GAPS_HEADERS: [&str; 6] = ["Event", "Aux Sum", "Books Sum", "Gap", "Bank Count", "Books Count"];
const TEMPLATE_HEADERS: [&str; 3] = ["פרטים", "סכום", "מס' ספק"];

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Read one sheet of a workbook: `sheet_hint` when the workbook has it,
/// otherwise the first sheet.
pub fn read(path: &Path, sheet_hint: Option<&str>) -> Result<Table, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IoError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet = sheet_hint
        .and_then(|hint| sheet_names.iter().find(|name| name.as_str() == hint))
        .or_else(|| sheet_names.first())
        .cloned()
        .ok_or_else(|| IoError::NoSheets { path: path.to_path_buf() })?;

    let range = workbook.worksheet_range(&sheet).map_err(|e| IoError::Sheet {
        sheet: sheet.clone(),
        message: e.to_string(),
    })?;

    let grid: Vec<Vec<CellValue>> = range.rows().map(|row| row.iter().map(convert_cell).collect()).collect();
    let table = table_from_grid(grid);
    debug!(path = %path.display(), sheet = %sheet, rows = table.len(), "workbook sheet read");
    Ok(table)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        // Assumes the 1900 date system, as nearly every workbook uses.
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            serial_to_datetime(serial).map_or(CellValue::Number(serial), CellValue::Date)
        }
        Data::DateTimeIso(s) => parse_iso(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Date),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Write the result workbook: tagged data, per-tag summary, supplier ledger,
/// and the transfer-batch gaps sheet when there are gaps.
pub fn write_result_workbook(result: &ReconResult, path: &Path) -> Result<(), IoError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = add_rtl_sheet(&mut workbook, DATA_SHEET)?;
    write_table(sheet, &result.table, &header)?;

    let sheet = add_rtl_sheet(&mut workbook, SUMMARY_SHEET)?;
    write_headers(sheet, &SUMMARY_HEADERS, &header)?;
    let mut row = 1u32;
    for (tag, count) in &result.stats.by_tag {
        sheet.write_number(row, 0, f64::from(*tag))?;
        sheet.write_number(row, 1, *count as f64)?;
        row += 1;
    }
    if result.stats.preset > 0 {
        sheet.write_string(row, 0, "other")?;
        sheet.write_number(row, 1, result.stats.preset as f64)?;
    }

    let sheet = add_rtl_sheet(&mut workbook, LEDGER_SHEET)?;
    write_headers(sheet, &LEDGER_HEADERS, &header)?;
    for (i, record) in result.supplier_ledger.iter().enumerate() {
        write_ledger_row(sheet, i as u32 + 1, record)?;
    }

    if !result.rule3_gaps.is_empty() {
        let sheet = add_rtl_sheet(&mut workbook, GAPS_SHEET)?;
        write_headers(sheet, &GAPS_HEADERS, &header)?;
        for (i, gap) in result.rule3_gaps.iter().enumerate() {
            write_gap_row(sheet, i as u32 + 1, gap)?;
        }
    }

    workbook.save(path)?;
    debug!(path = %path.display(), rows = result.table.len(), "result workbook written");
    Ok(())
}

/// Blank supplier import template with two sample rows.
pub fn write_supplier_template(path: &Path) -> Result<(), IoError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = add_rtl_sheet(&mut workbook, TEMPLATE_SHEET)?;

    write_headers(sheet, &TEMPLATE_HEADERS, &header)?;
    sheet.write_string(1, 0, "שם ספק לדוגמה")?;
    sheet.write_number(1, 2, 12345.0)?;
    sheet.write_number(2, 1, 150.50)?;
    sheet.write_number(2, 2, 98765.0)?;

    for (col, width) in [30.0, 15.0, 15.0].into_iter().enumerate() {
        sheet.set_column_width(col as u16, width)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn add_rtl_sheet<'a>(workbook: &'a mut Workbook, name: &str) -> Result<&'a mut Worksheet, IoError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;
    sheet.set_right_to_left(true);
    Ok(sheet)
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<(), IoError> {
    for (col, name) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, format)?;
    }
    Ok(())
}

fn write_table(sheet: &mut Worksheet, table: &Table, header: &Format) -> Result<(), IoError> {
    for (col, name) in table.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, header)?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            write_cell(sheet, r as u32 + 1, c as u16, cell)?;
        }
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> Result<(), IoError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            sheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        CellValue::Date(_) => {
            sheet.write_string(row, col, cell.to_string())?;
        }
    }
    Ok(())
}

fn write_ledger_row(sheet: &mut Worksheet, row: u32, record: &LedgerRecord) -> Result<(), IoError> {
    sheet.write_string(row, 0, &record.details)?;
    if let Some(amount) = record.amount {
        sheet.write_number(row, 1, amount)?;
    }
    sheet.write_string(row, 2, &record.supplier_id)?;
    sheet.write_number(row, 3, record.debit)?;
    sheet.write_number(row, 4, record.credit)?;
    Ok(())
}

fn write_gap_row(sheet: &mut Worksheet, row: u32, gap: &GapReport) -> Result<(), IoError> {
    sheet.write_string(row, 0, &gap.event_date)?;
    sheet.write_number(row, 1, gap.aux_sum)?;
    write_amount_or_na(sheet, row, 2, gap.books_sum)?;
    write_amount_or_na(sheet, row, 3, gap.gap)?;
    sheet.write_number(row, 4, gap.bank_count as f64)?;
    sheet.write_number(row, 5, gap.books_count as f64)?;
    Ok(())
}

fn write_amount_or_na(sheet: &mut Worksheet, row: u32, col: u16, value: Option<f64>) -> Result<(), IoError> {
    match value {
        Some(v) => sheet.write_number(row, col, v)?,
        None => sheet.write_string(row, col, "N/A")?,
    };
    Ok(())
}
