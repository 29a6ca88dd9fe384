// Run and validate commands

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use ledgermatch_config::SupplierStore;
use ledgermatch_io::{read_table, write_result_json, write_result_workbook, write_table_csv, DATA_SHEET};
use ledgermatch_recon::model::GapReport;
use ledgermatch_recon::{ReconConfig, ReconInput, ReconResult, Rule};
use tracing::info;

use crate::exit_codes::{EXIT_RULES, EXIT_UNMATCHED};
use crate::{CliError, SUPPLIERS_ENV};

#[derive(Args)]
pub struct RunArgs {
    /// Statement/books file (.xlsx, .xls, .ods, .csv, .tsv)
    pub primary: PathBuf,

    /// Transfer-batch file; rule 3 is skipped without it
    #[arg(long)]
    pub aux: Option<PathBuf>,

    /// Rule config (TOML); built-in defaults when omitted
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Supplier store (default: <config dir>/ledgermatch/suppliers.json)
    #[arg(long, env = SUPPLIERS_ENV)]
    pub suppliers: Option<PathBuf>,

    /// Sheet to read from the primary workbook (default: the data sheet, else the first)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Write the result workbook (.xlsx)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Write the tagged table as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Write the result as JSON to a file
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Exit with code 6 when any row is left unmatched
    #[arg(long)]
    pub fail_on_unmatched: bool,
}

pub fn cmd_run(args: RunArgs, quiet: bool) -> Result<(), CliError> {
    if let Some(path) = &args.output {
        if !has_extension(path, "xlsx") {
            return Err(CliError::usage(format!("--output must be an .xlsx file: {}", path.display()))
                .with_hint("use --csv or --json-output for other formats"));
        }
    }

    let config = match &args.rules {
        Some(path) => load_rules(path)?,
        None => ReconConfig::default(),
    };

    let store_path = args.suppliers.clone().unwrap_or_else(SupplierStore::default_path);
    let suppliers = SupplierStore::open(store_path).map_err(CliError::store)?.into_config();

    let sheet = args.sheet.as_deref().unwrap_or(DATA_SHEET);
    let primary = read_table(&args.primary, Some(sheet)).map_err(CliError::input)?;
    let auxiliary = match &args.aux {
        Some(path) => Some(read_table(path, None).map_err(CliError::input)?),
        None => None,
    };

    info!(primary = %args.primary.display(), rows = primary.len(), "input loaded");
    let result = ledgermatch_recon::run(&config, &suppliers, ReconInput { primary, auxiliary });

    write_outputs(&args, &result)?;

    if !quiet {
        print_summary(&result, &args);
    }

    let unmatched = result.stats.unmatched();
    if args.fail_on_unmatched && unmatched > 0 {
        return Err(CliError::new(EXIT_UNMATCHED, format!("{unmatched} row(s) left unmatched")));
    }
    Ok(())
}

pub fn cmd_validate(rules: PathBuf) -> Result<(), CliError> {
    let config = load_rules(&rules)?;
    eprintln!(
        "valid: {} rules; {} phrase rules, transfer epsilon {}, check tolerance {}, small-amount ceiling {}",
        Rule::ALL.len(),
        config.phrase_rules.len(),
        config.transfers.epsilon,
        config.checks.tolerance,
        config.small_amounts.ceiling,
    );
    Ok(())
}

fn load_rules(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_RULES, format!("cannot read rules {}: {e}", path.display()))
    })?;
    ReconConfig::from_toml(&text).map_err(CliError::rules)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn write_outputs(args: &RunArgs, result: &ReconResult) -> Result<(), CliError> {
    if let Some(path) = &args.output {
        write_result_workbook(result, path)
            .map_err(|e| CliError::output(format!("cannot write {}: {e}", path.display())))?;
        info!(path = %path.display(), "result workbook written");
    }

    if let Some(path) = &args.csv {
        let file = File::create(path)
            .map_err(|e| CliError::output(format!("cannot create {}: {e}", path.display())))?;
        write_table_csv(&result.table, BufWriter::new(file))
            .map_err(|e| CliError::output(format!("cannot write {}: {e}", path.display())))?;
        info!(path = %path.display(), "tagged csv written");
    }

    if let Some(path) = &args.json_output {
        let file = File::create(path)
            .map_err(|e| CliError::output(format!("cannot create {}: {e}", path.display())))?;
        write_result_json(result, BufWriter::new(file))
            .map_err(|e| CliError::output(format!("cannot write {}: {e}", path.display())))?;
        info!(path = %path.display(), "result json written");
    }

    if args.json {
        let stdout = io::stdout();
        write_result_json(result, stdout.lock())
            .map_err(|e| CliError::output(format!("cannot write JSON to stdout: {e}")))?;
    }

    Ok(())
}

fn print_summary(result: &ReconResult, args: &RunArgs) {
    let stats = &result.stats;
    let stderr = io::stderr();
    let mut out = stderr.lock();

    // Best effort: a closed stderr must not fail the run.
    let _ = writeln!(
        out,
        "{}: {} rows, {} matched, {} unmatched, {} preset",
        args.primary.display(),
        stats.total(),
        stats.matched(),
        stats.unmatched(),
        stats.preset,
    );
    for rule in Rule::ALL {
        let id = rule.id();
        let _ = writeln!(out, "  rule {:>2}  {:<18} {}", id.get(), rule.name(), stats.count(id.get()));
    }

    if args.aux.is_none() {
        let _ = writeln!(out, "transfer batches: skipped (no --aux)");
    } else if !result.rule3_gaps.is_empty() {
        let _ = writeln!(out, "transfer batches: {} gap(s)", result.rule3_gaps.len());
        for gap in &result.rule3_gaps {
            let _ = writeln!(out, "  {}", format_gap(gap));
        }
    }

    let _ = writeln!(out, "supplier ledger: {} record(s)", result.supplier_ledger.len());
}

fn format_gap(gap: &GapReport) -> String {
    let na = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"));
    format!(
        "{}: aux {:.2}, books {}, gap {} (bank {}, books {})",
        gap.event_date,
        gap.aux_sum,
        na(gap.books_sum),
        na(gap.gap),
        gap.bank_count,
        gap.books_count,
    )
}
