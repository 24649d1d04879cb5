use assert_cmd::Command;
use predicates::prelude::*;
use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;
use tempfile::TempDir;

// ===========================================================================
// Helpers
// ===========================================================================

const ANALYSIS_JSON: &str = r#"{
    "project_name": "Marina Tower",
    "currency": "USD",
    "start_date": "2025-01-01",
    "price": 1000000,
    "down_payment": 200000,
    "discount_rate_pct": 5
}"#;

const ANALYSIS_YAML: &str = "\
project_name: Garden Villas
currency: GBP
start_date: 2025-01-01
price: 600000
down_payment: 60000
discount_rate_pct: 3
phases:
  - frequency: Specific Date
    target_date: 2025-09-01
    payment_pct: 20
    interest_rate_pct: 4
  - frequency: Quarterly
    years: 5
    interest_rate_pct: 4
";

fn payplan() -> Command {
    Command::cargo_bin("payplan").unwrap()
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

// ===========================================================================
// Commands
// ===========================================================================

#[test]
fn test_version() {
    payplan()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("payplan "));
}

#[test]
fn test_schedule_from_json_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "plan.json", ANALYSIS_JSON);

    let output = payplan()
        .args(["schedule", "--input", &input])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["result"]["payment_count"], 38);
    assert_eq!(value["result"]["schedule"][0]["phase"], "Phase 1");
    assert_eq!(value["result"]["schedule"][0]["payment_date"], "2025-06-15");
    assert_eq!(value["result"]["termination"]["status"], "completed");
}

#[test]
fn test_schedule_from_yaml_with_editor_spellings() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "plan.yaml", ANALYSIS_YAML);

    let output = payplan()
        .args(["schedule", "--input", &input])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // One dated payment then 20 quarterly payments.
    assert_eq!(value["result"]["payment_count"], 21);
    assert!(value["result"]["skipped_phases"].as_array().unwrap().is_empty());
}

#[test]
fn test_flags_alone_use_default_plan() {
    payplan()
        .args([
            "npv",
            "--price",
            "1000000",
            "--down-payment",
            "200000",
            "--start-date",
            "2025-01-01",
            "--discount-rate",
            "0",
            "--output",
            "minimal",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-"));
}

#[test]
fn test_flag_overrides_file_value() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "plan.json", ANALYSIS_JSON);

    let output = payplan()
        .args(["npv", "--input", &input, "--discount-rate", "0"])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // Undiscounted NPV is exactly the negated total paid.
    let decimal = |v: &serde_json::Value| Decimal::from_str(v.as_str().unwrap()).unwrap();
    assert_eq!(
        decimal(&value["result"]["adjusted_npv"]),
        decimal(&value["result"]["total_paid"])
    );
    assert_eq!(value["result"]["discount_rate_pct"], "0");
}

#[test]
fn test_missing_price_is_an_error() {
    payplan()
        .args(["schedule", "--start-date", "2025-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--price is required"));
}

#[test]
fn test_missing_input_file_is_an_error() {
    payplan()
        .args(["schedule", "--input", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_csv_output_is_the_schedule() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "plan.json", ANALYSIS_JSON);

    payplan()
        .args(["schedule", "--input", &input, "--output", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Phase,Payment Date,Payment,Interest,Principal,Balance\nPhase 1,2025-06-15,100000",
        ));
}

#[test]
fn test_table_output_has_schedule_section() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "plan.json", ANALYSIS_JSON);

    payplan()
        .args(["schedule", "--input", &input, "--output", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Payment schedule:"))
        .stdout(predicate::str::contains("Jun 15, 2025"));
}

#[test]
fn test_export_writes_every_row() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "plan.json", ANALYSIS_JSON);
    let out = dir.path().join("schedule.csv");

    payplan()
        .args(["export", "--input", &input, "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rows\": 38"));

    let csv = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 39);
    assert_eq!(lines[0], "Phase,Payment Date,Payment,Interest,Principal,Balance");
}

#[test]
fn test_report_is_capped_at_thirty_rows() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "plan.json", ANALYSIS_JSON);
    let out = dir.path().join("report.txt");

    payplan()
        .args(["report", "--input", &input, "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"truncated\": true"));

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("INVESTMENT ANALYSIS REPORT"));
    assert!(text.contains("PROJECT: Marina Tower"));
    assert!(text.contains("8 more payment(s) not shown"));
}

#[test]
fn test_report_failure_keeps_analysis() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "plan.json", ANALYSIS_JSON);
    let out = dir.path().join("report.txt");

    let output = payplan()
        .args(["report", "--input", &input, "--currency", "EUR", "--out"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!out.exists());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["result"]["report"].is_null());
    assert!(value["result"]["report_error"]
        .as_str()
        .unwrap()
        .contains("currency_symbol"));
    assert_eq!(value["result"]["payment_count"], 38);
}

#[test]
fn test_compare_lists_scenarios_in_order() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.json", ANALYSIS_JSON);
    let b = write_file(&dir, "b.yaml", ANALYSIS_YAML);

    let output = payplan()
        .args(["compare", "--inputs", &a, &b])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0]["scenario"].as_str().unwrap().starts_with("Marina Tower ("));
    assert!(rows[1]["scenario"].as_str().unwrap().starts_with("Garden Villas ("));
    assert_eq!(rows[1]["currency_symbol"], "£");
}

#[test]
fn test_default_plan_has_three_rows() {
    let output = payplan().arg("default-plan").output().unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["frequency"], "Monthly");
}
