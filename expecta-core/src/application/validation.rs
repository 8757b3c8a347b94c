// expecta-core/src/application/validation.rs

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::application::loader::{filter_table, load_rules};
use crate::application::runner::ValidationRunner;
use crate::domain::report::Report;
use crate::error::ExpectaError;
use crate::ports::accessor::DataAccessor;
use crate::ports::rule_source::RuleSource;

/// Fetch -> load -> run. Only an unreadable rule source fails the call;
/// everything rule-level ends up in the report.
#[instrument(skip_all, fields(source = %source.describe()))]
pub async fn run_validation(
    source: &dyn RuleSource,
    accessor: &dyn DataAccessor,
    runner: &ValidationRunner,
    table: Option<&str>,
    cancel: CancellationToken,
) -> Result<Report, ExpectaError> {
    let rows = filter_table(source.fetch_rules().await?, table);
    info!(count = rows.len(), "Rule rows fetched");

    let rules = load_rules(&rows, Some(runner.registry()));
    Ok(runner.run(&rules, accessor, cancel).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::runner::RunOptions;
    use crate::domain::error::ErrorKind;
    use crate::domain::expectation::registry::ExpectationRegistry;
    use crate::domain::report::Outcome;
    use crate::domain::rule::RawRuleRow;
    use crate::domain::value::CellValue;
    use crate::infrastructure::adapters::duckdb::DuckDBAccessor;
    use crate::infrastructure::adapters::memory::{MemoryAccessor, MemoryTable};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::time::{Duration, Instant};

    struct StaticRules(Vec<RawRuleRow>);

    #[async_trait]
    impl RuleSource for StaticRules {
        async fn fetch_rules(&self) -> Result<Vec<RawRuleRow>, ExpectaError> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".into()
        }
    }

    fn runner() -> ValidationRunner {
        ValidationRunner::new(ExpectationRegistry::builtin(), RunOptions::default())
    }

    #[tokio::test]
    async fn test_table_filter_and_compound_uniqueness() -> Result<()> {
        let accessor = MemoryAccessor::new().with_table(
            MemoryTable::new("EVENTS")
                .column("DATE", "DATE")
                .column("USER", "VARCHAR")
                .column("ID", "BIGINT")
                .row(vec!["2025-01-01".into(), "ana".into(), CellValue::Int(1)])
                .row(vec!["2025-01-01".into(), "ana".into(), CellValue::Int(1)]),
        );
        let source = StaticRules(vec![
            RawRuleRow::new(
                "EVENTS",
                None,
                "expect_compound_columns_to_be_unique",
                Some(r#"{"column_list": ["DATE", "USER", "ID"]}"#),
            ),
            RawRuleRow::new("ORDERS", Some("ID"), "expect_column_values_to_not_be_null", None),
        ]);

        let report = run_validation(&source, &accessor, &runner(), Some("events"), CancellationToken::new()).await?;
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].outcome, Outcome::Failed);
        assert_eq!(report.results[0].violations, Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_duckdb_end_to_end() -> Result<()> {
        let accessor = DuckDBAccessor::in_memory()?;
        accessor.execute(
            "CREATE TABLE customers (email VARCHAR);
             INSERT INTO customers VALUES ('a@b.com'), ('bad'), (NULL);
             CREATE TABLE table_validation_config (
                table_name VARCHAR, column_name VARCHAR, expectation_type VARCHAR,
                params_json VARCHAR, is_enabled BOOLEAN);
             INSERT INTO table_validation_config VALUES
                ('CUSTOMERS', 'EMAIL', 'expect_column_values_to_match_regex',
                 '{\"regex\": \"[^@]+@[^@]+\\\\.[^@]+\"}', TRUE),
                ('CUSTOMERS', 'EMAIL', 'expect_column_values_to_be_of_type',
                 '{\"type_\": \"TEXT\"}', TRUE);",
        )?;
        let source = accessor.rule_source("table_validation_config");

        let report = run_validation(&source, &accessor, &runner(), None, CancellationToken::new()).await?;
        assert_eq!(report.results[0].outcome, Outcome::Failed);
        assert_eq!(report.results[0].violations, Some(2));
        assert_eq!(report.results[1].outcome, Outcome::Passed);
        Ok(())
    }

    #[tokio::test]
    async fn test_duckdb_slow_query_times_out() -> Result<()> {
        let accessor = DuckDBAccessor::in_memory()?;
        accessor.execute(
            "CREATE VIEW big AS SELECT a.range AS x FROM range(30000) a, range(30000) b;",
        )?;
        let source = StaticRules(vec![RawRuleRow::new(
            "BIG",
            Some("X"),
            "expect_column_values_to_be_unique",
            None,
        )]);
        let runner = ValidationRunner::new(
            ExpectationRegistry::builtin(),
            RunOptions {
                rule_timeout: Some(Duration::from_millis(200)),
                ..RunOptions::default()
            },
        );

        let started = Instant::now();
        let report = run_validation(&source, &accessor, &runner, None, CancellationToken::new()).await?;
        assert_eq!(report.results[0].outcome, Outcome::Errored);
        assert_eq!(report.results[0].error_kind, Some(ErrorKind::Timeout));
        assert!(started.elapsed() < Duration::from_secs(10));

        // The interrupted query leaves the database usable.
        assert_eq!(accessor.column_type("big", "x").await?, "BIGINT");
        Ok(())
    }
}
