mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

use common::TestWorkspace;

fn ledger(workspace: &TestWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("manpower-ledger").expect("binary exists");
    cmd.arg("--data-dir").arg(workspace.path());
    cmd
}

#[test]
fn kpi_prints_rupiah_totals() {
    let workspace = TestWorkspace::with_sample_sheets();
    ledger(&workspace)
        .arg("kpi")
        .assert()
        .success()
        .stdout(contains("== Key Metrics =="))
        .stdout(contains("Rp 3.000.000"))
        .stdout(contains("Active Employees:     3"));
}

#[test]
fn project_filter_narrows_pnl_summary() {
    let workspace = TestWorkspace::with_sample_sheets();
    ledger(&workspace)
        .args(["pnl-summary", "--project", "Beta"])
        .assert()
        .success()
        .stdout(contains("Beta"))
        .stdout(contains("Alpha").not())
        .stdout(contains("-80.00%"));
}

#[test]
fn cost_breakdown_prints_grand_total() {
    let workspace = TestWorkspace::with_sample_sheets();
    ledger(&workspace)
        .args(["cost-breakdown", "--from", "2024-02-01", "--to", "2024-02-29"])
        .assert()
        .success()
        .stdout(contains("GRAND TOTAL"))
        .stdout(contains("Rp 200.000"))
        .stdout(contains("Ops").not());
}

#[test]
fn json_format_serializes_views() {
    let workspace = TestWorkspace::with_sample_sheets();
    let output = ledger(&workspace)
        .args(["compensation", "--format", "json"])
        .output()
        .expect("run compensation");
    assert!(output.status.success());
    let view: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json view");
    assert_eq!(view["title"], "Employee Compensation & Benefit Structure");
    assert_eq!(view["has_grand_total"], true);
    assert_eq!(view["rows"].as_array().map(Vec::len), Some(3));
}

#[test]
fn dashboard_renders_every_view() {
    let workspace = TestWorkspace::with_sample_sheets();
    ledger(&workspace)
        .arg("dashboard")
        .assert()
        .success()
        .stdout(contains("== Project Timeline =="))
        .stdout(contains("== Time Series Analysis =="))
        .stdout(contains("== Employee Cost Allocation =="));
}

#[test]
fn missing_sheets_degrade_to_notices() {
    let workspace = TestWorkspace::new();
    ledger(&workspace)
        .arg("dashboard")
        .assert()
        .success()
        .stdout(contains("Unable to load data"))
        .stderr(contains("Project_PnL is unavailable"));
}

#[test]
fn json_output_names_unavailable_sheets() {
    let workspace = TestWorkspace::new();
    workspace.write("Employees.csv", common::EMPLOYEES);
    let output = ledger(&workspace)
        .env("RUST_LOG", "off")
        .args(["kpi", "--format", "json"])
        .output()
        .expect("run kpi");
    assert!(output.status.success());
    assert!(output.stderr.is_empty());

    let view: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json view");
    let warnings = view["warnings"].as_array().expect("warnings array");
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0]
            .as_str()
            .is_some_and(|w| w.starts_with("Project_PnL is unavailable"))
    );
}

#[test]
fn table_output_prints_warnings() {
    let workspace = TestWorkspace::new();
    ledger(&workspace)
        .env("RUST_LOG", "off")
        .arg("timeline")
        .assert()
        .success()
        .stdout(contains("warning: Projects is unavailable"));
}

#[test]
fn invalid_config_is_an_error() {
    let workspace = TestWorkspace::new();
    let config = workspace.write("ledger.yaml", "source:\n  delimiter: \"::\"\n");
    Command::cargo_bin("manpower-ledger")
        .expect("binary exists")
        .arg("--config")
        .arg(&config)
        .arg("kpi")
        .assert()
        .failure()
        .stderr(contains("error:"));
}
