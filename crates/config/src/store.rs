use std::fs;
use std::path::{Path, PathBuf};

use ledgermatch_recon::model::Table;
use ledgermatch_recon::normalize::{amount_key, parse_amount};
use ledgermatch_recon::resolve_column;
use ledgermatch_recon::supplier::{NameMapping, SupplierConfig};
use tracing::debug;

use crate::defaults::default_suppliers;
use crate::error::StoreError;

const SUPPLIER_ALIASES: [&str; 3] = ["מס' ספק", "מס ספק", "Supplier"];
const DETAILS_ALIASES: [&str; 3] = ["פרטים", "תיאור", "Details"];
const AMOUNT_ALIASES: [&str; 2] = ["סכום", "Amount"];

/// Counts of entries added or updated by a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub names: usize,
    pub amounts: usize,
}

/// Supplier mapping persisted as JSON.
#[derive(Debug, Clone)]
pub struct SupplierStore {
    path: PathBuf,
    config: SupplierConfig,
}

impl SupplierStore {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ledgermatch")
            .join("suppliers.json")
    }

    /// Load the store at `path`, or the built-in mapping when the file does not
    /// exist yet. A file that exists but does not parse is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            debug!(path = %path.display(), "supplier store missing; using defaults");
            return Ok(Self { path, config: default_suppliers() });
        }

        let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, config })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.config).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &SupplierConfig {
        &self.config
    }

    pub fn into_config(self) -> SupplierConfig {
        self.config
    }

    /// Map a details substring to a supplier. An existing pattern keeps its
    /// position; a new one is appended.
    pub fn set_name(&mut self, pattern: &str, supplier: &str) {
        let supplier = supplier.trim().to_string();
        match self.config.names.iter_mut().find(|m| m.pattern == pattern) {
            Some(entry) => entry.supplier = supplier,
            None => self.config.names.push(NameMapping { pattern: pattern.to_string(), supplier }),
        }
    }

    /// Map an absolute amount (two decimals) to a supplier.
    pub fn set_amount(&mut self, amount: f64, supplier: &str) {
        self.config.amounts.insert(amount_key(amount), supplier.trim().to_string());
    }

    pub fn remove_name(&mut self, pattern: &str) -> bool {
        let before = self.config.names.len();
        self.config.names.retain(|m| m.pattern != pattern);
        self.config.names.len() != before
    }

    pub fn remove_amount(&mut self, amount: f64) -> bool {
        self.config.amounts.remove(&amount_key(amount)).is_some()
    }

    pub fn reset(&mut self) {
        self.config = default_suppliers();
    }

    /// Bulk import from a supplier sheet. Rows without a supplier id are
    /// skipped; details add a name entry and a parseable non-zero amount adds
    /// an amount entry.
    pub fn import_table(&mut self, table: &Table) -> ImportSummary {
        let supplier_col = resolve_column(&table.headers, &SUPPLIER_ALIASES[..]);
        let details_col = resolve_column(&table.headers, &DETAILS_ALIASES[..]);
        let amount_col = resolve_column(&table.headers, &AMOUNT_ALIASES[..]);

        let mut summary = ImportSummary::default();
        for row in 0..table.len() {
            let supplier = table.cell(row, supplier_col).to_string();
            let supplier = supplier.trim();
            if supplier.is_empty() {
                continue;
            }

            let details = table.cell(row, details_col).to_string();
            let details = details.trim();
            if !details.is_empty() {
                self.set_name(details, supplier);
                summary.names += 1;
            }

            if let Some(amount) = parse_amount(table.cell(row, amount_col)).filter(|a| *a != 0.0) {
                self.set_amount(amount, supplier);
                summary.amounts += 1;
            }
        }

        debug!(names = summary.names, amounts = summary.amounts, "suppliers imported");
        summary
    }
}
