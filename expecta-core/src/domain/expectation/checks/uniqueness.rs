// expecta-core/src/domain/expectation/checks/uniqueness.rs

use async_trait::async_trait;

use crate::domain::expectation::binder::BoundParameters;
use crate::domain::expectation::check::{Check, Verdict};
use crate::error::ExpectaError;
use crate::ports::accessor::DataAccessor;

/// rows - distinct(non-null) values. A null therefore counts as a repeat.
pub struct UniqueCheck;

#[async_trait]
impl Check for UniqueCheck {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError> {
        let table = params.table();
        let column = params.column()?;

        let rows = accessor.count_rows(table).await?;
        let distinct = accessor.distinct_count(table, column).await?;
        let duplicates = rows.saturating_sub(distinct);

        Ok(Verdict::tally(duplicates, rows, params.mostly(), || {
            format!("{duplicates} non-unique rows in {table}.{column} ({distinct} distinct values over {rows} rows)")
        }))
    }
}

/// rows - distinct tuples over `column_list`.
pub struct CompoundUniqueCheck;

#[async_trait]
impl Check for CompoundUniqueCheck {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError> {
        let table = params.table();
        let columns = params.columns()?;

        let rows = accessor.count_rows(table).await?;
        let distinct = accessor.distinct_count_compound(table, columns).await?;
        let duplicates = rows.saturating_sub(distinct);

        Ok(Verdict::tally(duplicates, rows, params.mostly(), || {
            format!(
                "{duplicates} duplicate rows in {table} over ({})",
                columns.join(", ")
            )
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::expectation::checks::fixtures::{params, single_column};
    use crate::domain::value::CellValue;
    use crate::infrastructure::adapters::memory::{MemoryAccessor, MemoryTable};

    const UNIQUE: &str = "expect_column_values_to_be_unique";
    const COMPOUND: &str = "expect_compound_columns_to_be_unique";
    const TRIPLE: &str = r#"{"column_list": ["DATE", "USER", "ID"]}"#;

    fn events(rows: Vec<(&str, &str, i64)>) -> MemoryAccessor {
        let mut table = MemoryTable::new("EVENTS")
            .column("DATE", "DATE")
            .column("USER", "VARCHAR")
            .column("ID", "BIGINT");
        for (date, user, id) in rows {
            table = table.row(vec![date.into(), user.into(), CellValue::Int(id)]);
        }
        MemoryAccessor::new().with_table(table)
    }

    #[tokio::test]
    async fn test_unique_values_pass() {
        let accessor = single_column(
            "ORDERS",
            "ID",
            "BIGINT",
            vec![CellValue::Int(1), CellValue::Int(2), CellValue::Int(3)],
        );
        let verdict = UniqueCheck
            .evaluate(&accessor, &params("ORDERS", Some("ID"), UNIQUE, "{}"))
            .await
            .unwrap();
        assert!(verdict.passed);
    }

    #[tokio::test]
    async fn test_duplicates_fail_and_rerun_is_stable() {
        let accessor = single_column(
            "ORDERS",
            "ID",
            "BIGINT",
            vec![CellValue::Int(1), CellValue::Int(1), CellValue::Int(2)],
        );
        let bound = params("ORDERS", Some("ID"), UNIQUE, "{}");
        let first = UniqueCheck.evaluate(&accessor, &bound).await.unwrap();
        let second = UniqueCheck.evaluate(&accessor, &bound).await.unwrap();
        assert!(!first.passed);
        assert_eq!(first.violations, Some(1));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_table_is_unique() {
        let accessor = single_column("ORDERS", "ID", "BIGINT", vec![]);
        let verdict = UniqueCheck
            .evaluate(&accessor, &params("ORDERS", Some("ID"), UNIQUE, "{}"))
            .await
            .unwrap();
        assert!(verdict.passed);
    }

    #[tokio::test]
    async fn test_compound_duplicate_triple_fails() {
        let accessor = events(vec![
            ("2025-01-01", "ana", 1),
            ("2025-01-01", "ana", 1),
            ("2025-01-01", "bob", 1),
            ("2025-01-02", "ana", 1),
        ]);
        let verdict = CompoundUniqueCheck
            .evaluate(&accessor, &params("EVENTS", None, COMPOUND, TRIPLE))
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.violations, Some(1));
    }

    #[tokio::test]
    async fn test_compound_without_duplicates_passes() {
        let accessor = events(vec![
            ("2025-01-01", "ana", 1),
            ("2025-01-01", "ana", 2),
            ("2025-01-02", "ana", 1),
        ]);
        let verdict = CompoundUniqueCheck
            .evaluate(&accessor, &params("EVENTS", None, COMPOUND, TRIPLE))
            .await
            .unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.violations, Some(0));
    }

    #[tokio::test]
    async fn test_compound_empty_table_passes() {
        let verdict = CompoundUniqueCheck
            .evaluate(&events(vec![]), &params("EVENTS", None, COMPOUND, TRIPLE))
            .await
            .unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.violations, Some(0));
    }
}
