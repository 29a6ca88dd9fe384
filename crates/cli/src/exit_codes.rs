//! CLI Exit Code Registry
//!
//! Single source of truth for `ledgermatch` exit codes. Scripts and schedulers
//! branch on these, so a code never changes meaning once shipped.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | CLI usage error (bad args, conflicting flags)            |
//! | 3    | Input file missing, unreadable or in an unknown format   |
//! | 4    | Rule config failed to parse or validate                  |
//! | 5    | An output file could not be written                      |
//! | 6    | Unmatched rows remain and `--fail-on-unmatched` was set  |
//! | 7    | Supplier store could not be read or written              |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below with what triggers it
//! 2. Update the table above
//! 3. Add a `CliError` constructor in `main.rs` if commands need one

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Reconciliation (3-7)
// =============================================================================

/// Statement, auxiliary or supplier sheet could not be opened or parsed.
pub const EXIT_INPUT: u8 = 3;

/// Rule TOML is malformed or fails validation.
pub const EXIT_RULES: u8 = 4;

/// Workbook, CSV or JSON output could not be written.
pub const EXIT_OUTPUT: u8 = 5;

/// Run finished but rows are still tagged 0 (only with `--fail-on-unmatched`).
pub const EXIT_UNMATCHED: u8 = 6;

/// Supplier store JSON is corrupt or the file system refused access.
pub const EXIT_STORE: u8 = 7;
