//! `ledgermatch-recon` - bank statement vs. bookkeeping reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, tags every row with the first
//! of eleven ordered matching rules that claims it, and returns the tagged
//! table with stats, the standing-order supplier ledger, and transfer-batch gap
//! reports. No CLI or IO dependencies.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod state;
pub mod stats;
pub mod supplier;

pub use config::ReconConfig;
pub use engine::{run, Rule};
pub use error::ReconError;
pub use model::{CellValue, GapReport, LedgerRecord, MatchTag, ReconInput, ReconResult, RuleId, Table};
pub use schema::resolve_column;
pub use stats::MatchStats;
pub use supplier::{NameMapping, SupplierConfig};
