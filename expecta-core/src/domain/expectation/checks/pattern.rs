// expecta-core/src/domain/expectation/checks/pattern.rs

// Null policy for both checks: a null value is a violation.
// A row without a value cannot be said to match a pattern or a format.

use async_trait::async_trait;
use chrono::format::{ParseErrorKind, ParseResult, Parsed, StrftimeItems, parse};

use crate::domain::expectation::binder::{BoundParameters, required};
use crate::domain::expectation::check::{Check, Verdict};
use crate::domain::expectation::checks::{NullPolicy, sample_suffix, scan_column};
use crate::domain::value::CellValue;
use crate::error::ExpectaError;
use crate::ports::accessor::DataAccessor;

pub struct RegexCheck;

#[async_trait]
impl Check for RegexCheck {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError> {
        let table = params.table();
        let column = params.column()?;
        let pattern = required("regex", params.regex("regex"))?;

        let tally = scan_column(accessor, table, column, NullPolicy::Violate, |value| {
            value.as_text().is_some_and(|text| pattern.is_match(&text))
        })
        .await?;

        Ok(Verdict::tally(tally.violations, tally.evaluated, params.mostly(), || {
            format!(
                "{} of {} values in {table}.{column} do not match '{}'{}",
                tally.violations,
                tally.evaluated,
                pattern.as_str(),
                sample_suffix(&tally.sample)
            )
        })
        .with_sample(tally.sample))
    }
}

pub struct StrftimeCheck;

#[async_trait]
impl Check for StrftimeCheck {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError> {
        let table = params.table();
        let column = params.column()?;
        let format = required("strftime_format", params.text("strftime_format"))?;

        let tally = scan_column(accessor, table, column, NullPolicy::Violate, |value| {
            matches_format(value, format)
        })
        .await?;

        Ok(Verdict::tally(tally.violations, tally.evaluated, params.mostly(), || {
            format!(
                "{} of {} values in {table}.{column} do not parse as '{format}'{}",
                tally.violations,
                tally.evaluated,
                sample_suffix(&tally.sample)
            )
        })
        .with_sample(tally.sample))
    }
}

/// The whole value must be consumed by the format and name a real calendar
/// date and time. Partial formats (`%Y-%m`, `%H:%M`) only check what they carry.
fn matches_format(value: &CellValue, format: &str) -> bool {
    let Some(text) = value.as_text() else {
        return false;
    };
    let mut parsed = Parsed::new();
    if parse(&mut parsed, &text, StrftimeItems::new(format)).is_err() {
        return false;
    }
    resolves(parsed.to_naive_date()) && resolves(parsed.to_naive_time())
}

/// Missing fields are tolerated, contradictory or impossible ones are not.
fn resolves<T>(resolved: ParseResult<T>) -> bool {
    match resolved {
        Ok(_) => true,
        Err(e) => e.kind() == ParseErrorKind::NotEnough,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::expectation::checks::fixtures::{params, single_column};

    const REGEX: &str = "expect_column_values_to_match_regex";
    const STRFTIME: &str = "expect_column_values_to_match_strftime_format";

    #[tokio::test]
    async fn test_email_regex_counts_null_as_violation() {
        let accessor = single_column(
            "CUSTOMERS",
            "EMAIL",
            "VARCHAR",
            vec!["a@b.com".into(), "bad".into(), CellValue::Null],
        );
        let bound = params(
            "CUSTOMERS",
            Some("EMAIL"),
            REGEX,
            r#"{"regex": "[^@]+@[^@]+\\.[^@]+"}"#,
        );
        let verdict = RegexCheck.evaluate(&accessor, &bound).await.unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.violations, Some(2));
        assert_eq!(verdict.sample.as_deref(), Some("bad"));
    }

    #[tokio::test]
    async fn test_regex_all_matching_pass() {
        let accessor = single_column(
            "CUSTOMERS",
            "CODE",
            "VARCHAR",
            vec!["AB-1".into(), "CD-22".into()],
        );
        let bound = params("CUSTOMERS", Some("CODE"), REGEX, r#"{"regex": "^[A-Z]{2}-\\d+$"}"#);
        assert!(RegexCheck.evaluate(&accessor, &bound).await.unwrap().passed);
    }

    #[tokio::test]
    async fn test_regex_empty_table_passes() {
        let accessor = single_column("CUSTOMERS", "EMAIL", "VARCHAR", vec![]);
        let bound = params("CUSTOMERS", Some("EMAIL"), REGEX, r#"{"regex": "@"}"#);
        assert!(RegexCheck.evaluate(&accessor, &bound).await.unwrap().passed);
    }

    #[tokio::test]
    async fn test_strftime_format() {
        let accessor = single_column(
            "TEST_DATES",
            "EVENT_DATE",
            "VARCHAR",
            vec!["2025-01-31".into(), "2025-13-01".into(), "31/01/2025".into()],
        );
        let bound = params(
            "TEST_DATES",
            Some("EVENT_DATE"),
            STRFTIME,
            r#"{"strftime_format": "%Y-%m-%d"}"#,
        );
        let verdict = StrftimeCheck.evaluate(&accessor, &bound).await.unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.violations, Some(2));
        assert_eq!(verdict.sample.as_deref(), Some("2025-13-01"));
    }

    #[tokio::test]
    async fn test_strftime_with_mostly() {
        let accessor = single_column(
            "TEST_DATES",
            "EVENT_DATE",
            "VARCHAR",
            vec!["2025-01-31".into(), "2025-02-01".into(), "2025-02-02".into(), "oops".into()],
        );
        let bound = params(
            "TEST_DATES",
            Some("EVENT_DATE"),
            STRFTIME,
            r#"{"strftime_format": "%Y-%m-%d", "mostly": 0.75}"#,
        );
        let verdict = StrftimeCheck.evaluate(&accessor, &bound).await.unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.violations, Some(1));
    }

    #[tokio::test]
    async fn test_strftime_rejects_impossible_dates() {
        let accessor = single_column(
            "TEST_DATES",
            "EVENT_DATE",
            "VARCHAR",
            vec!["2025-02-30".into(), "2025-04-31".into(), "2024-02-29".into()],
        );
        let bound = params(
            "TEST_DATES",
            Some("EVENT_DATE"),
            STRFTIME,
            r#"{"strftime_format": "%Y-%m-%d"}"#,
        );
        let verdict = StrftimeCheck.evaluate(&accessor, &bound).await.unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.violations, Some(2));
        assert_eq!(verdict.sample.as_deref(), Some("2025-02-30"));
    }

    #[tokio::test]
    async fn test_strftime_partial_formats() {
        let accessor = single_column(
            "TEST_DATES",
            "PERIOD",
            "VARCHAR",
            vec!["2025-02".into(), "2025-13".into()],
        );
        let bound = params("TEST_DATES", Some("PERIOD"), STRFTIME, r#"{"strftime_format": "%Y-%m"}"#);
        let verdict = StrftimeCheck.evaluate(&accessor, &bound).await.unwrap();
        assert_eq!(verdict.violations, Some(1));

        let clock = single_column("SHIFTS", "START", "VARCHAR", vec!["08:30".into(), "23:59".into()]);
        let bound = params("SHIFTS", Some("START"), STRFTIME, r#"{"strftime_format": "%H:%M"}"#);
        assert!(StrftimeCheck.evaluate(&clock, &bound).await.unwrap().passed);
    }

    #[tokio::test]
    async fn test_strftime_empty_table_passes() {
        let accessor = single_column("TEST_DATES", "EVENT_DATE", "VARCHAR", vec![]);
        let bound = params(
            "TEST_DATES",
            Some("EVENT_DATE"),
            STRFTIME,
            r#"{"strftime_format": "%Y-%m-%d"}"#,
        );
        let verdict = StrftimeCheck.evaluate(&accessor, &bound).await.unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.violations, Some(0));
    }
}
