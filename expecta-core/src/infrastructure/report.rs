// expecta-core/src/infrastructure/report.rs

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::error::ErrorKind;
use crate::domain::report::{Outcome, Report, RuleResult, Summary};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

pub const REPORT_FILE: &str = "run_results.json";

#[derive(Debug, Serialize)]
pub struct ResultRecord<'a> {
    pub index: usize,
    pub table: &'a str,
    pub column: Option<&'a str>,
    pub expectation_type: &'a str,
    pub outcome: Outcome,
    pub detail: &'a str,
    pub elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<&'a str>,
    #[serde(skip_serializing_if = "no_warnings")]
    pub warnings: &'a [String],
}

fn no_warnings(warnings: &&[String]) -> bool {
    warnings.is_empty()
}

impl<'a> From<&'a RuleResult> for ResultRecord<'a> {
    fn from(result: &'a RuleResult) -> Self {
        Self {
            index: result.rule.index,
            table: &result.rule.table,
            column: result.rule.column.as_deref(),
            expectation_type: &result.rule.expectation_type,
            outcome: result.outcome,
            detail: &result.detail,
            elapsed_ms: result.elapsed.as_millis(),
            error_kind: result.error_kind,
            violations: result.violations,
            sample: result.sample.as_deref(),
            warnings: &result.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub started_at: String,
    pub elapsed_ms: u128,
    pub summary: &'a Summary,
    pub results: Vec<ResultRecord<'a>>,
}

impl<'a> From<&'a Report> for ReportDocument<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            started_at: report.started_at.to_rfc3339(),
            elapsed_ms: report.elapsed.as_millis(),
            summary: &report.summary,
            results: report.results.iter().map(ResultRecord::from).collect(),
        }
    }
}

pub fn render_json(report: &Report) -> Result<String, InfrastructureError> {
    Ok(serde_json::to_string_pretty(&ReportDocument::from(report))?)
}

/// Writes `<target_dir>/run_results.json` and returns its path.
pub fn save_report(report: &Report, target_dir: &Path) -> Result<PathBuf, InfrastructureError> {
    let path = target_dir.join(REPORT_FILE);
    atomic_write(&path, render_json(report)?)?;
    info!(path = ?path, status = %report.status(), "Report written");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::report::ResultAggregator;
    use crate::domain::rule::RuleIdentity;
    use anyhow::Result;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    fn sample_report() -> Report {
        let identity = |index: usize, column: Option<&str>| {
            Arc::new(RuleIdentity {
                index,
                table: "ORDERS".into(),
                column: column.map(str::to_string),
                expectation_type: "expect_column_values_to_not_be_null".into(),
            })
        };
        let mut aggregator = ResultAggregator::new();
        aggregator.add(RuleResult::skipped(identity(0, Some("ID"))));
        aggregator.add(RuleResult::errored(
            identity(1, None),
            ErrorKind::ScopeMismatch,
            "no column",
            Duration::from_millis(3),
        ));
        aggregator.finish(Utc::now(), Duration::from_millis(10))
    }

    #[test]
    fn test_json_shape() -> Result<()> {
        let value: serde_json::Value = serde_json::from_str(&render_json(&sample_report())?)?;
        assert_eq!(value["summary"]["status"], "ERRORED");
        assert_eq!(value["summary"]["tables"]["ORDERS"], "ERRORED");
        assert_eq!(value["results"][0]["outcome"], "SKIPPED");
        assert_eq!(value["results"][1]["column"], serde_json::Value::Null);
        assert_eq!(value["results"][1]["error_kind"], "scope_mismatch");
        assert!(value["results"][0].get("error_kind").is_none());
        Ok(())
    }

    #[test]
    fn test_save_report_creates_target_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = save_report(&sample_report(), &dir.path().join("target"))?;
        assert!(path.ends_with("target/run_results.json"));
        assert!(std::fs::read_to_string(path)?.contains("\"total\": 2"));
        Ok(())
    }
}
