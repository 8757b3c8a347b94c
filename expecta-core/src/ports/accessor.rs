// expecta-core/src/ports/accessor.rs

// The read-only window the checks get on the data.
// The engine never knows whether rows live in DuckDB, DataFusion or a Vec:
// it only asks for counts, a value scan or a column type.

use async_trait::async_trait;
use futures::stream::BoxStream;
use miette::Diagnostic;
use thiserror::Error;

use crate::domain::value::CellValue;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum AccessorError {
    #[error("Table '{0}' not found")]
    #[diagnostic(code(expecta::accessor::table_not_found))]
    TableNotFound(String),

    #[error("Column '{column}' not found in table '{table}'")]
    #[diagnostic(code(expecta::accessor::column_not_found))]
    ColumnNotFound { table: String, column: String },

    #[error("Data source error: {0}")]
    #[diagnostic(
        code(expecta::accessor::backend),
        help("The underlying engine could not evaluate the request.")
    )]
    Backend(String),
}

/// Finite sequence of cell values, one per row.
pub type ValueStream = BoxStream<'static, Result<CellValue, AccessorError>>;

#[async_trait]
pub trait DataAccessor: Send + Sync {
    async fn count_rows(&self, table: &str) -> Result<u64, AccessorError>;

    async fn count_nulls(&self, table: &str, column: &str) -> Result<u64, AccessorError>;

    /// Number of distinct non-null values.
    async fn distinct_count(&self, table: &str, column: &str) -> Result<u64, AccessorError>;

    /// Number of distinct value tuples across `columns` (null is a value here).
    async fn distinct_count_compound(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<u64, AccessorError>;

    /// Every call returns a fresh stream starting at the first row.
    async fn scan_values(&self, table: &str, column: &str) -> Result<ValueStream, AccessorError>;

    /// Declared (or inferred) type token of the column, as the engine spells it.
    async fn column_type(&self, table: &str, column: &str) -> Result<String, AccessorError>;

    fn engine_name(&self) -> &str;
}
