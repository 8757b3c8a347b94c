// expecta-core/src/domain/expectation/checks/types.rs

use async_trait::async_trait;

use crate::domain::expectation::binder::{BoundParameters, required};
use crate::domain::expectation::check::{Check, Verdict};
use crate::error::ExpectaError;
use crate::ports::accessor::DataAccessor;

/// Compares the declared column type with `type_`, ignoring engine-specific spellings.
pub struct TypeCheck;

#[async_trait]
impl Check for TypeCheck {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError> {
        let table = params.table();
        let column = params.column()?;
        let expected = required("type_", params.text("type_"))?;

        let actual = accessor.column_type(table, column).await?;
        let detail = format!("{table}.{column} is {actual}, expected {expected}");

        if canonical_type(&actual) == canonical_type(expected) {
            Ok(Verdict::pass(detail))
        } else {
            Ok(Verdict::fail(detail))
        }
    }
}

/// Collapses the aliases DuckDB and Arrow use for the same logical type.
pub fn canonical_type(raw: &str) -> String {
    let upper = raw.trim().to_ascii_uppercase();
    // DECIMAL(18,3) -> DECIMAL, Timestamp(Nanosecond, None) -> TIMESTAMP
    let base = upper
        .split(['(', '<'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let canonical = match base.as_str() {
        "INT" | "INTEGER" | "INT4" | "INT32" | "SIGNED" => "INTEGER",
        "BIGINT" | "INT8" | "INT64" | "LONG" => "BIGINT",
        "SMALLINT" | "INT2" | "INT16" | "SHORT" => "SMALLINT",
        "TINYINT" | "INT1" => "TINYINT",
        "UBIGINT" | "UINT64" => "UBIGINT",
        "UINTEGER" | "UINT32" => "UINTEGER",
        "DOUBLE" | "FLOAT8" | "FLOAT64" | "DOUBLE PRECISION" => "DOUBLE",
        "FLOAT" | "FLOAT4" | "REAL" | "FLOAT32" => "FLOAT",
        "DECIMAL" | "NUMERIC" | "DECIMAL128" => "DECIMAL",
        "VARCHAR" | "TEXT" | "STRING" | "CHAR" | "BPCHAR" | "UTF8" | "LARGEUTF8"
        | "UTF8VIEW" => "VARCHAR",
        "BOOL" | "BOOLEAN" | "LOGICAL" => "BOOLEAN",
        "DATE" | "DATE32" | "DATE64" => "DATE",
        "TIMESTAMP" | "DATETIME" => "TIMESTAMP",
        other => other,
    };
    canonical.to_string()
}
