// expecta-core/src/domain/expectation/checks/volume.rs

use async_trait::async_trait;

use crate::domain::expectation::binder::BoundParameters;
use crate::domain::expectation::check::{Check, Verdict};
use crate::error::ExpectaError;
use crate::ports::accessor::DataAccessor;

/// Table-level: the row count must fall within the inclusive bounds.
pub struct RowCountCheck;

#[async_trait]
impl Check for RowCountCheck {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError> {
        let table = params.table();
        let min = params.integer("min_value");
        let max = params.integer("max_value");

        let rows = i64::try_from(accessor.count_rows(table).await?).unwrap_or(i64::MAX);
        let within = min.is_none_or(|m| rows >= m) && max.is_none_or(|m| rows <= m);

        let lower = min.map_or_else(|| "0".to_string(), |m| m.to_string());
        let upper = max.map_or_else(|| "+inf".to_string(), |m| m.to_string());
        let detail = format!("{table} has {rows} rows, expected [{lower}, {upper}]");

        Ok(if within {
            Verdict::pass(detail)
        } else {
            Verdict::fail(detail)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::expectation::checks::fixtures::{params, single_column};
    use crate::domain::value::CellValue;

    const ROW_COUNT: &str = "expect_table_row_count_to_be_between";

    #[tokio::test]
    async fn test_row_count_within_bounds() {
        let accessor = single_column("ORDERS", "ID", "BIGINT", vec![CellValue::Int(1), CellValue::Int(2)]);
        let bound = params("ORDERS", None, ROW_COUNT, r#"{"min_value": 1, "max_value": 2}"#);
        let verdict = RowCountCheck.evaluate(&accessor, &bound).await.unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.detail, "ORDERS has 2 rows, expected [1, 2]");
    }

    #[tokio::test]
    async fn test_empty_table_below_minimum_fails() {
        let accessor = single_column("ORDERS", "ID", "BIGINT", vec![]);
        let bound = params("ORDERS", None, ROW_COUNT, r#"{"min_value": 1}"#);
        assert!(!RowCountCheck.evaluate(&accessor, &bound).await.unwrap().passed);
    }
}
