// Supplier store commands

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Subcommand;
use ledgermatch_config::SupplierStore;
use ledgermatch_io::{read_table, write_supplier_template};
use tracing::info;

use crate::CliError;

#[derive(Subcommand)]
pub enum SupplierCommands {
    /// Print the name and amount mappings
    Show {
        /// Print the store as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the store file location
    Path,

    /// Map a details substring to a supplier id
    AddName {
        /// Substring searched for in the row details
        pattern: String,
        /// Supplier id
        supplier: String,
    },

    /// Map an absolute amount to a supplier id
    AddAmount {
        /// Amount; the sign is ignored
        #[arg(allow_hyphen_values = true)]
        amount: f64,
        /// Supplier id
        supplier: String,
    },

    /// Delete a name mapping
    RemoveName {
        pattern: String,
    },

    /// Delete an amount mapping
    RemoveAmount {
        #[arg(allow_hyphen_values = true)]
        amount: f64,
    },

    /// Bulk import from a supplier sheet (details, amount, supplier id columns)
    Import {
        /// Supplier sheet (.xlsx, .csv, ...)
        file: PathBuf,
        /// Sheet to read (default: the first)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Write a blank import template workbook
    Template {
        /// Output path (.xlsx)
        output: PathBuf,
    },

    /// Replace the store with the built-in mapping
    Reset,
}

pub fn cmd_suppliers(store: Option<PathBuf>, command: SupplierCommands) -> Result<(), CliError> {
    let path = store.unwrap_or_else(SupplierStore::default_path);
    let open = || SupplierStore::open(&path).map_err(CliError::store);

    match command {
        SupplierCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        SupplierCommands::Template { output } => {
            write_supplier_template(&output)
                .map_err(|e| CliError::output(format!("cannot write {}: {e}", output.display())))?;
            eprintln!("wrote {}", output.display());
            Ok(())
        }
        SupplierCommands::Show { json } => show(&open()?, json),
        SupplierCommands::AddName { pattern, supplier } => {
            let mut store = open()?;
            let supplier = require_supplier(&supplier)?;
            if pattern.trim().is_empty() {
                return Err(CliError::usage("pattern must not be empty"));
            }
            store.set_name(&pattern, supplier);
            save(&store)?;
            eprintln!("name '{pattern}' -> {supplier}");
            Ok(())
        }
        SupplierCommands::AddAmount { amount, supplier } => {
            let mut store = open()?;
            let supplier = require_supplier(&supplier)?;
            if !amount.is_finite() || amount == 0.0 {
                return Err(CliError::usage(format!("amount must be a non-zero number, got {amount}")));
            }
            store.set_amount(amount, supplier);
            save(&store)?;
            eprintln!("amount {:.2} -> {supplier}", amount.abs());
            Ok(())
        }
        SupplierCommands::RemoveName { pattern } => {
            let mut store = open()?;
            if !store.remove_name(&pattern) {
                return Err(CliError::general(format!("no name mapping for '{pattern}'"))
                    .with_hint("list mappings with `ledgermatch suppliers show`"));
            }
            save(&store)?;
            eprintln!("removed name '{pattern}'");
            Ok(())
        }
        SupplierCommands::RemoveAmount { amount } => {
            let mut store = open()?;
            if !store.remove_amount(amount) {
                return Err(CliError::general(format!("no amount mapping for {:.2}", amount.abs()))
                    .with_hint("list mappings with `ledgermatch suppliers show`"));
            }
            save(&store)?;
            eprintln!("removed amount {:.2}", amount.abs());
            Ok(())
        }
        SupplierCommands::Import { file, sheet } => {
            let mut store = open()?;
            let table = read_table(&file, sheet.as_deref()).map_err(CliError::input)?;
            let summary = store.import_table(&table);
            save(&store)?;
            info!(file = %file.display(), rows = table.len(), "supplier sheet imported");
            eprintln!("imported {} name(s), {} amount(s) from {}", summary.names, summary.amounts, file.display());
            Ok(())
        }
        SupplierCommands::Reset => {
            let mut store = open()?;
            store.reset();
            save(&store)?;
            eprintln!("supplier store reset to defaults");
            Ok(())
        }
    }
}

fn require_supplier(supplier: &str) -> Result<&str, CliError> {
    let trimmed = supplier.trim();
    if trimmed.is_empty() {
        return Err(CliError::usage("supplier id must not be empty"));
    }
    Ok(trimmed)
}

fn save(store: &SupplierStore) -> Result<(), CliError> {
    store.save().map_err(CliError::store)?;
    info!(path = %store.path().display(), "supplier store saved");
    Ok(())
}

fn show(store: &SupplierStore, json: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let config = store.config();

    let write_err = |e: io::Error| CliError::output(format!("cannot write to stdout: {e}"));

    if json {
        serde_json::to_writer_pretty(&mut out, config)
            .map_err(|e| CliError::output(format!("cannot write JSON to stdout: {e}")))?;
        writeln!(out).map_err(write_err)?;
        return Ok(());
    }

    writeln!(out, "# {}", store.path().display()).map_err(write_err)?;
    writeln!(out, "names ({}):", config.names.len()).map_err(write_err)?;
    for mapping in &config.names {
        writeln!(out, "  {}\t{}", mapping.pattern, mapping.supplier).map_err(write_err)?;
    }
    writeln!(out, "amounts ({}):", config.amounts.len()).map_err(write_err)?;
    for (amount, supplier) in &config.amounts {
        writeln!(out, "  {amount}\t{supplier}").map_err(write_err)?;
    }
    Ok(())
}
