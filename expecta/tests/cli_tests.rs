use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const ORDERS_CSV: &str = "\
id,email,status,amount
1,ana@shop.io,paid,120
2,bob@shop.io,shipped,80
3,,paid,15
4,eve@shop.io,lost,2500
";

/// Throwaway project: one CSV source plus rules and config files.
struct ExpectaTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl ExpectaTestEnv {
    fn new(rules: &str) -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().join("shop");
        std::fs::create_dir_all(root.join("data"))?;
        std::fs::write(root.join("data/orders.csv"), ORDERS_CSV)?;
        std::fs::write(root.join("rules.yaml"), rules)?;
        std::fs::write(
            root.join("expecta.yaml"),
            "name: shop\nversion: 1.0.0\nengine: duckdb\ndatabase: \":memory:\"\n\
             max-workers: 2\nsources:\n  ORDERS: data/orders.csv\nrules:\n  file: rules.yaml\n",
        )?;
        Ok(Self { _tmp: tmp, root })
    }

    /// Replaces the generated `expecta.yaml`.
    fn with_config(self, config: &str) -> Result<Self> {
        std::fs::write(self.root.join("expecta.yaml"), config)?;
        Ok(self)
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn expecta(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("expecta"));
        cmd.current_dir(&self.root);
        cmd
    }

    fn report(&self) -> Result<serde_json::Value> {
        let path = self.root.join("target/run_results.json");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("report not found at {:?}", path))?;
        Ok(serde_json::from_str(&content)?)
    }
}

const PASSING_RULES: &str = r#"
rules:
  - table_name: ORDERS
    column_name: ID
    expectation_type: expect_column_values_to_be_unique
  - table_name: ORDERS
    expectation_type: expect_table_row_count_to_be_between
    params: { min_value: 1, max_value: 10 }
  - table_name: ORDERS
    column_name: STATUS
    expectation_type: expect_column_values_to_be_in_set
    params: { value_set: [paid, shipped, lost] }
"#;

const FAILING_RULES: &str = r#"
rules:
  - table_name: ORDERS
    column_name: EMAIL
    expectation_type: expect_column_values_to_not_be_null
  - table_name: ORDERS
    column_name: AMOUNT
    expectation_type: expect_column_values_to_be_between
    params: { min_value: 0, max_value: 1000 }
  - table_name: ORDERS
    column_name: ID
    expectation_type: expect_column_values_to_be_unique
    is_enabled: false
"#;

#[test]
fn test_run_passes_and_writes_report() -> Result<()> {
    let env = ExpectaTestEnv::new(PASSING_RULES)?;

    env.expecta()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation passed for ORDERS"))
        .stdout(predicate::str::contains("SUCCESS"));

    let report = env.report()?;
    assert_eq!(report["summary"]["status"], "PASSED");
    assert_eq!(report["summary"]["tables"]["ORDERS"], "PASSED");
    assert_eq!(report["summary"]["total"], 3);
    assert_eq!(report["results"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[test]
fn test_run_failures_exit_one_with_json_on_stdout() -> Result<()> {
    let env = ExpectaTestEnv::new(FAILING_RULES)?;

    let output = env
        .expecta()
        .args(["run", "--format", "json"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let printed: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(printed["summary"]["status"], "FAILED");
    assert_eq!(printed["summary"]["failed"], 2);
    assert_eq!(printed["summary"]["skipped"], 1);
    assert_eq!(printed["results"][1]["violations"], 1);

    // Same document on disk.
    assert_eq!(env.report()?["summary"], printed["summary"]);
    Ok(())
}

#[test]
fn test_run_table_filter() -> Result<()> {
    let rules = format!(
        "{}  - table_name: CUSTOMERS\n    column_name: ID\n    expectation_type: expect_column_values_to_not_be_null\n",
        PASSING_RULES
    );
    let env = ExpectaTestEnv::new(&rules)?;

    // CUSTOMERS does not exist; filtering it out keeps the run green.
    env.expecta().args(["run", "-t", "orders"]).assert().success();
    assert_eq!(env.report()?["summary"]["total"], 3);

    env.expecta().arg("run").assert().code(2);
    Ok(())
}

#[test]
fn test_run_unknown_expectation_is_errored() -> Result<()> {
    let env = ExpectaTestEnv::new(
        "- table_name: ORDERS\n  expectation_type: expect_the_unexpected\n",
    )?;

    env.expecta().arg("run").assert().code(2);

    let report = env.report()?;
    assert_eq!(report["results"][0]["outcome"], "ERRORED");
    assert_eq!(report["results"][0]["error_kind"], "unknown_expectation");
    Ok(())
}

#[test]
fn test_run_without_config_fails() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    Command::new(assert_cmd::cargo::cargo_bin!("expecta"))
        .args(["run", "--project-dir"])
        .arg(tmp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("CRITICAL VALIDATION ERROR"));
    Ok(())
}

#[test]
fn test_check_reports_misconfigured_rules() -> Result<()> {
    let env = ExpectaTestEnv::new(
        r#"
- table_name: ORDERS
  column_name: STATUS
  expectation_type: expect_column_values_to_be_in_set
- table_name: ORDERS
  column_name: EMAIL
  expectation_type: expect_column_values_to_match_regex
  params_json: '{"regex": "^[a-z]+@"}'
"#,
    )?;

    env.expecta()
        .args(["check", "--project-dir"])
        .arg(env.root())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("value_set"));

    // Nothing was evaluated, so no report.
    assert!(!env.root().join("target").exists());
    Ok(())
}

#[test]
fn test_check_accepts_valid_rules() -> Result<()> {
    let env = ExpectaTestEnv::new(PASSING_RULES)?;
    env.expecta()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("All 3 rules are valid"));
    Ok(())
}

#[test]
fn test_check_with_rule_file_leaves_no_database() -> Result<()> {
    let env = ExpectaTestEnv::new(PASSING_RULES)?.with_config(
        "name: shop\nengine: duckdb\ndatabase: shop.duckdb\n\
         sources:\n  ORDERS: data/orders.csv\nrules:\n  file: rules.yaml\n",
    )?;

    env.expecta().arg("check").assert().success();
    assert!(!env.root().join("shop.duckdb").exists());

    // A run does open it.
    env.expecta().arg("run").assert().success();
    assert!(env.root().join("shop.duckdb").exists());
    Ok(())
}

#[test]
fn test_expectations_lists_catalog() -> Result<()> {
    Command::new(assert_cmd::cargo::cargo_bin!("expecta"))
        .arg("expectations")
        .assert()
        .success()
        .stdout(predicate::str::contains("expect_column_values_to_be_between"))
        .stdout(predicate::str::contains("expect_table_row_count_to_be_between"));
    Ok(())
}
