// End-to-end tests for the ledgermatch binary.
// Run with: cargo test -p ledgermatch-cli --test cli_tests -- --nocapture

use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn ledgermatch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ledgermatch"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("LEDGERMATCH_SUPPLIERS");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be JSON: {e}\nstdout:\n{stdout}"))
}

// ===========================================================================
// run
// ===========================================================================

#[test]
fn run_json_tags_every_rule() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("suppliers.json");

    let output = ledgermatch()
        .args(["run", "tests/fixtures/statement.csv", "--aux", "tests/fixtures/transfers.csv", "--json"])
        .args(["--suppliers", path_str(&store)])
        .output()
        .expect("run ledgermatch");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val = json_stdout(&output);

    let tags = val["tags"].as_array().expect("tags array");
    let numeric: Vec<u64> = tags.iter().take(16).map(|t| t.as_u64().unwrap()).collect();
    assert_eq!(numeric, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 6, 7, 8, 9, 10, 11, 11]);
    assert_eq!(tags[16], "ידני");
    assert_eq!(tags[17], 0);

    assert_eq!(val["stats"]["by_tag"]["0"], 1);
    assert_eq!(val["stats"]["preset"], 1);
    assert_eq!(val["meta"]["has_auxiliary"], true);
    assert!(val["rule3_gaps"].as_array().unwrap().is_empty());
}

#[test]
fn run_summary_goes_to_stderr() {
    let dir = tempdir().unwrap();
    let output = ledgermatch()
        .args(["run", "tests/fixtures/statement.csv"])
        .args(["--suppliers", path_str(&dir.path().join("s.json"))])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "nothing on stdout without --json");
    let err = stderr(&output);
    assert!(err.contains("18 rows"), "stderr: {err}");
    assert!(err.contains("transfer batches: skipped"));
    assert!(err.contains("supplier ledger: 2 record(s)"));
}

#[test]
fn run_quiet_prints_nothing() {
    let dir = tempdir().unwrap();
    let output = ledgermatch()
        .args(["-q", "run", "tests/fixtures/statement.csv"])
        .args(["--suppliers", path_str(&dir.path().join("s.json"))])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "stderr: {}", stderr(&output));
}

#[test]
fn run_reports_gaps() {
    let dir = tempdir().unwrap();
    let output = ledgermatch()
        .args(["run", "tests/fixtures/statement.csv", "--aux", "tests/fixtures/transfers_gap.csv"])
        .args(["--suppliers", path_str(&dir.path().join("s.json"))])
        .output()
        .unwrap();

    assert!(output.status.success());
    let err = stderr(&output);
    assert!(err.contains("transfer batches: 1 gap(s)"), "stderr: {err}");
    assert!(err.contains("2024-03-01: aux 70.00, books 80.00, gap N/A (bank 0, books 1)"));
}

#[test]
fn run_writes_all_outputs() {
    let dir = tempdir().unwrap();
    let xlsx = dir.path().join("result.xlsx");
    let csv = dir.path().join("tagged.csv");
    let json = dir.path().join("result.json");

    let output = ledgermatch()
        .args(["run", "tests/fixtures/statement.csv", "--aux", "tests/fixtures/transfers.csv"])
        .args(["--suppliers", path_str(&dir.path().join("s.json"))])
        .args(["--output", path_str(&xlsx)])
        .args(["--csv", path_str(&csv)])
        .args(["--json-output", path_str(&json)])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(xlsx.exists());

    let text = std::fs::read_to_string(&csv).unwrap();
    assert!(text.lines().nth(1).unwrap().starts_with("1,175,"));

    let val: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(val["meta"]["rows"], 18);

    // The written workbook feeds straight back in; tags survive the round trip.
    let rerun = ledgermatch()
        .args(["run", path_str(&xlsx), "--json"])
        .args(["--suppliers", path_str(&dir.path().join("s.json"))])
        .output()
        .unwrap();
    assert!(rerun.status.success(), "stderr: {}", stderr(&rerun));
    assert_eq!(json_stdout(&rerun)["tags"], val["tags"]);
}

#[test]
fn fail_on_unmatched_exit_code() {
    let dir = tempdir().unwrap();
    let output = ledgermatch()
        .args(["run", "tests/fixtures/statement.csv", "--fail-on-unmatched"])
        .args(["--suppliers", path_str(&dir.path().join("s.json"))])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(6));
    assert!(stderr(&output).contains("error: 3 row(s) left unmatched"));
}

#[test]
fn empty_statement_runs() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.csv");
    std::fs::write(&empty, "קוד פעולה,סכום בדף\n").unwrap();

    let output = ledgermatch()
        .args(["run", path_str(&empty), "--json", "--fail-on-unmatched"])
        .args(["--suppliers", path_str(&dir.path().join("s.json"))])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val = json_stdout(&output);
    assert_eq!(val["meta"]["rows"], 0);
    assert_eq!(val["stats"]["by_tag"].as_object().unwrap().len(), 12);
}

#[test]
fn missing_input_exit_code() {
    let output = ledgermatch()
        .args(["run", "tests/fixtures/nope.csv", "--suppliers", "tests/fixtures/none.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).starts_with("error: cannot open"));
}

#[test]
fn unsupported_format_has_hint() {
    let output = ledgermatch()
        .args(["run", "statement.pdf", "--suppliers", "tests/fixtures/none.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn output_must_be_xlsx() {
    let output = ledgermatch()
        .args(["run", "tests/fixtures/statement.csv", "--output", "result.csv"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn corrupt_supplier_store_exit_code() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("s.json");
    std::fs::write(&store, "[oops").unwrap();

    let output = ledgermatch()
        .args(["run", "tests/fixtures/statement.csv", "--suppliers", path_str(&store)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(stderr(&output).contains("suppliers reset"));
}

#[test]
fn custom_rules_file() {
    let dir = tempdir().unwrap();
    let rules = dir.path().join("rules.toml");
    // A rule-5 ceiling under 999.99 leaves that row unmatched.
    std::fs::write(&rules, "[small_amounts]\nceiling = 500.0\n").unwrap();

    let output = ledgermatch()
        .args(["run", "tests/fixtures/statement.csv", "--json"])
        .args(["--rules", path_str(&rules)])
        .args(["--suppliers", path_str(&dir.path().join("s.json"))])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json_stdout(&output)["tags"][8], 0);
}

// ===========================================================================
// validate
// ===========================================================================

#[test]
fn validate_accepts_partial_config() {
    let dir = tempdir().unwrap();
    let rules = dir.path().join("rules.toml");
    std::fs::write(&rules, "[checks]\ntolerance = 1.0\n").unwrap();

    let output = ledgermatch().args(["validate", path_str(&rules)]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).starts_with("valid: 11 rules"));
}

#[test]
fn validate_rejects_bad_config() {
    let dir = tempdir().unwrap();
    let rules = dir.path().join("rules.toml");
    std::fs::write(&rules, "[[phrase_rules]]\ncode = 1\nphrase = \"x\"\n").unwrap();

    let output = ledgermatch().args(["validate", path_str(&rules)]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("phrase_rules"));

    let unknown = dir.path().join("unknown.toml");
    std::fs::write(&unknown, "[nonsense]\n").unwrap();
    let output = ledgermatch().args(["validate", path_str(&unknown)]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
}

// ===========================================================================
// suppliers
// ===========================================================================

#[test]
fn suppliers_path_honours_store_flag() {
    let output = ledgermatch()
        .args(["suppliers", "path", "--store", "/tmp/ledgermatch-test/s.json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "/tmp/ledgermatch-test/s.json");
}

#[test]
fn suppliers_show_defaults_as_json() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("s.json");
    let output = ledgermatch()
        .args(["suppliers", "show", "--json", "--store", path_str(&store)])
        .output()
        .unwrap();

    assert!(output.status.success());
    let val = json_stdout(&output);
    assert_eq!(val["names"].as_array().unwrap().len(), 27);
    assert!(!store.exists(), "show must not create the store");
}

#[test]
fn added_name_feeds_the_supplier_ledger() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("s.json");

    let output = ledgermatch()
        .args(["suppliers", "add-name", "חברת חשמל", "30015", "--store", path_str(&store)])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(store.exists());

    let output = ledgermatch()
        .args(["run", "tests/fixtures/statement.csv", "--json"])
        .args(["--suppliers", path_str(&store)])
        .output()
        .unwrap();
    assert!(output.status.success());

    let val = json_stdout(&output);
    let ledger = val["supplier_ledger"].as_array().unwrap();
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger[0]["supplier_id"], "30015");
    assert_eq!(ledger[2]["credit"], 320.0);
}

#[test]
fn amount_mappings_add_and_remove() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("s.json");
    let store_arg = path_str(&store);

    let add = ledgermatch()
        .args(["suppliers", "add-amount", "-75", "30065", "--store", store_arg])
        .output()
        .unwrap();
    assert!(add.status.success(), "stderr: {}", stderr(&add));

    let show = ledgermatch().args(["suppliers", "show", "--store", store_arg]).output().unwrap();
    assert!(String::from_utf8_lossy(&show.stdout).contains("75.00\t30065"));

    let remove = ledgermatch()
        .args(["suppliers", "remove-amount", "75", "--store", store_arg])
        .output()
        .unwrap();
    assert!(remove.status.success());

    let again = ledgermatch()
        .args(["suppliers", "remove-amount", "75", "--store", store_arg])
        .output()
        .unwrap();
    assert_eq!(again.status.code(), Some(1));
}

#[test]
fn template_then_import() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("s.json");
    let template = dir.path().join("template.xlsx");

    let output = ledgermatch()
        .args(["suppliers", "template", path_str(&template)])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = ledgermatch()
        .args(["suppliers", "import", path_str(&template), "--store", path_str(&store)])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("imported 1 name(s), 1 amount(s)"));

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(saved["amounts"]["150.50"], "98765");
}

#[test]
fn reset_restores_defaults() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("s.json");
    let store_arg = path_str(&store);

    let removed = ledgermatch()
        .args(["suppliers", "remove-name", "ישראכרט", "--store", store_arg])
        .output()
        .unwrap();
    assert!(removed.status.success());

    let reset = ledgermatch().args(["suppliers", "reset", "--store", store_arg]).output().unwrap();
    assert!(reset.status.success());

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(saved["names"].as_array().unwrap().len(), 27);
}
