//! `ledgermatch-io` - tabular file layer around the reconciliation engine.
//!
//! Reads spreadsheets and CSV into `Table`s and writes the result workbook,
//! the supplier import template, CSV and JSON.

pub mod csv;
pub mod error;
pub mod json;
pub mod table;
pub mod xlsx;

use std::path::Path;

use ledgermatch_recon::model::Table;

pub use error::IoError;
pub use json::write_result as write_result_json;
pub use xlsx::{write_result_workbook, write_supplier_template, DATA_SHEET};
pub use self::csv::write_table as write_table_csv;

/// Read a tabular file, dispatching on its extension.
///
/// For workbooks `sheet_hint` names the preferred sheet; the first sheet is
/// used when it is absent. CSV and TSV ignore the hint.
pub fn read_table(path: &Path, sheet_hint: Option<&str>) -> Result<Table, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => xlsx::read(path, sheet_hint),
        "csv" | "txt" => self::csv::read(path),
        "tsv" => self::csv::read_tsv(path),
        other => Err(IoError::UnsupportedFormat(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{other}")
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn dispatch_by_extension() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("data.CSV");
        fs::write(&csv_path, "a,b\n1,2\n").unwrap();
        assert_eq!(read_table(&csv_path, None).unwrap().len(), 1);

        let tsv_path = dir.path().join("data.tsv");
        fs::write(&tsv_path, "a\tb\n1\t2\n").unwrap();
        assert_eq!(read_table(&tsv_path, None).unwrap().headers, vec!["a", "b"]);
    }

    #[test]
    fn unsupported_extension() {
        let err = read_table(Path::new("statement.pdf"), None).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(ref e) if e == ".pdf"));
    }
}
