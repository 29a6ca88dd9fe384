// ledgermatch CLI - rule-ordered bank statement reconciliation

mod exit_codes;
mod logging;
mod recon;
mod suppliers;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{
    EXIT_ERROR, EXIT_INPUT, EXIT_OUTPUT, EXIT_RULES, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE,
};
use logging::{init_logging, LogConfig};
use recon::RunArgs;
use suppliers::SupplierCommands;

/// Environment variable naming the supplier store file.
pub const SUPPLIERS_ENV: &str = "LEDGERMATCH_SUPPLIERS";

#[derive(Parser)]
#[command(name = "ledgermatch")]
#[command(about = "Reconcile a bank statement against the books, rule by rule")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only; also suppresses the run summary
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag every statement row with the first rule that matches it
    #[command(after_help = "\
Examples:
  ledgermatch run statement.xlsx --aux transfers.xlsx --output result.xlsx
  ledgermatch run statement.csv --rules rules.toml --json > result.json
  ledgermatch run statement.xlsx --csv tagged.csv --fail-on-unmatched

Exit codes:
  0  success
  3  input file unreadable
  4  rule config invalid
  5  output could not be written
  6  unmatched rows remain (--fail-on-unmatched)
  7  supplier store unreadable")]
    Run(RunArgs),

    /// Parse and validate a rule config without running it
    #[command(after_help = "\
Examples:
  ledgermatch validate rules.toml")]
    Validate {
        /// Rule config file (TOML)
        rules: PathBuf,
    },

    /// Inspect and edit the supplier mapping used for standing orders
    #[command(after_help = "\
Examples:
  ledgermatch suppliers show
  ledgermatch suppliers add-name 'ועד בית' 50001
  ledgermatch suppliers add-amount 1150.50 98765
  ledgermatch suppliers template suppliers.xlsx
  ledgermatch suppliers import suppliers.xlsx")]
    Suppliers {
        /// Supplier store file (default: <config dir>/ledgermatch/suppliers.json)
        #[arg(long, global = true, env = SUPPLIERS_ENV)]
        store: Option<PathBuf>,

        #[command(subcommand)]
        command: SupplierCommands,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("LEDGERMATCH_GIT_HASH"), ")",
        "\nengine:  ledgermatch-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("LEDGERMATCH_TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_flags(cli.verbose, cli.quiet));

    let result = match cli.command {
        Commands::Run(args) => recon::cmd_run(args, cli.quiet),
        Commands::Validate { rules } => recon::cmd_validate(rules),
        Commands::Suppliers { store, command } => suppliers::cmd_suppliers(store, command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn input(err: ledgermatch_io::IoError) -> Self {
        let hint = match &err {
            ledgermatch_io::IoError::UnsupportedFormat(_) => {
                Some("supported inputs: .xlsx .xlsm .xlsb .xls .ods .csv .txt .tsv".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_INPUT, message: err.to_string(), hint }
    }

    pub fn rules(err: ledgermatch_recon::ReconError) -> Self {
        Self::new(EXIT_RULES, err.to_string())
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::new(EXIT_OUTPUT, msg)
    }

    pub fn store(err: ledgermatch_config::StoreError) -> Self {
        let hint = match &err {
            ledgermatch_config::StoreError::Json { .. } => {
                Some("fix the file by hand or run `ledgermatch suppliers reset`".to_string())
            }
            ledgermatch_config::StoreError::Io { .. } => None,
        };
        Self { code: EXIT_STORE, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
