// JSON export

use std::io::Write;

use ledgermatch_recon::model::ReconResult;

use crate::error::IoError;

/// Pretty JSON of the whole result bundle: meta, table, tags, stats, supplier
/// ledger and transfer-batch gaps.
pub fn write_result<W: Write>(result: &ReconResult, mut writer: W) -> Result<(), IoError> {
    serde_json::to_writer_pretty(&mut writer, result)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgermatch_recon::config::ReconConfig;
    use ledgermatch_recon::model::{CellValue, ReconInput, Table};
    use ledgermatch_recon::supplier::SupplierConfig;

    #[test]
    fn result_json_shape() {
        let mut primary = Table::new(vec!["Bank Code".into(), "Bank Amount".into()]);
        primary.rows.push(vec![CellValue::Number(469.0), CellValue::Number(-5.0)]);
        let result = ledgermatch_recon::run(
            &ReconConfig::default(),
            &SupplierConfig::default(),
            ReconInput { primary, auxiliary: None },
        );

        let mut out = Vec::new();
        write_result(&result, &mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(parsed["meta"]["rows"], 1);
        assert_eq!(parsed["meta"]["has_auxiliary"], false);
        assert_eq!(parsed["table"]["headers"][2], "התאמה");
        assert_eq!(parsed["table"]["rows"][0][2], 2.0);
        assert_eq!(parsed["tags"][0], 2);
        assert_eq!(parsed["stats"]["by_tag"]["2"], 1);
        assert!(parsed["rule3_gaps"].as_array().unwrap().is_empty());
    }
}
