// Raw grid -> header-driven Table

use std::collections::HashMap;

use ledgermatch_recon::model::{CellValue, Table};

/// Build a table from a raw grid whose first row holds the headers.
///
/// Headers are trimmed; blank ones become `__EMPTY`, `__EMPTY_1`, ... and
/// repeats get a `_<n>` suffix. Data rows with no non-empty cell are dropped.
pub fn table_from_grid(grid: Vec<Vec<CellValue>>) -> Table {
    let mut rows = grid.into_iter();
    let Some(header_row) = rows.next() else {
        return Table::default();
    };

    let headers = unique_headers(header_row.iter().map(|c| c.to_string().trim().to_string()));
    let mut table = Table::new(headers);
    table.rows = rows
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();
    table
}

fn unique_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut blanks = 0usize;
    let mut out = Vec::new();

    for header in raw {
        let base = if header.is_empty() {
            let name = if blanks == 0 { "__EMPTY".to_string() } else { format!("__EMPTY_{blanks}") };
            blanks += 1;
            name
        } else {
            header
        };

        let mut name = base.clone();
        if let Some(count) = seen.get_mut(&base) {
            name = format!("{base}_{count}");
            *count += 1;
        } else {
            seen.insert(base, 1);
        }
        out.push(name);
    }
    out
}
