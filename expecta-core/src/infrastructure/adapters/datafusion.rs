// expecta-core/src/infrastructure/adapters/datafusion.rs

use async_trait::async_trait;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::prelude::*;
use datafusion::scalar::ScalarValue;
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::domain::value::CellValue;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::accessor::{AccessorError, DataAccessor, ValueStream};

/// Accessor over a DataFusion session. Tables are whatever the session has
/// registered (CSV sources, in-memory tables created through SQL).
pub struct DataFusionAccessor {
    ctx: Arc<SessionContext>,
}

impl Default for DataFusionAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFusionAccessor {
    pub fn new() -> Self {
        Self {
            ctx: Arc::new(SessionContext::new()),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub async fn register_csv(&self, name: &str, path: &Path) -> Result<(), InfrastructureError> {
        let path_str = path.to_str().ok_or_else(|| {
            InfrastructureError::ConfigError(format!("Invalid path for source {}: {:?}", name, path))
        })?;
        debug!(table = name, path = path_str, "registering csv source");
        self.ctx
            .register_csv(name, path_str, CsvReadOptions::new())
            .await
            .map_err(|e| InfrastructureError::Database(DatabaseError::DataFusion(e)))
    }

    /// Runs a statement and drains it (DDL, CREATE TABLE AS VALUES...).
    pub async fn execute(&self, sql: &str) -> Result<(), InfrastructureError> {
        self.ctx.sql(sql).await?.collect().await?;
        Ok(())
    }

    async fn frame(&self, table: &str) -> Result<DataFrame, AccessorError> {
        if !self.ctx.table_exist(table)? {
            return Err(AccessorError::TableNotFound(table.to_string()));
        }
        Ok(self.ctx.table(table).await?)
    }

    /// Frame plus the column's name as the schema spells it.
    async fn frame_with_column(
        &self,
        table: &str,
        column: &str,
    ) -> Result<(DataFrame, String), AccessorError> {
        let df = self.frame(table).await?;
        let name = df
            .schema()
            .fields()
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(column))
            .map(|f| f.name().clone())
            .ok_or_else(|| AccessorError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
            })?;
        Ok((df, name))
    }
}

fn batch_cells(batch: &RecordBatch) -> Vec<Result<CellValue, AccessorError>> {
    let array = batch.column(0);
    (0..batch.num_rows())
        .map(|i| {
            ScalarValue::try_from_array(array, i)
                .map(to_cell)
                .map_err(AccessorError::from)
        })
        .collect()
}

fn to_cell(value: ScalarValue) -> CellValue {
    if value.is_null() {
        return CellValue::Null;
    }
    match value {
        ScalarValue::Boolean(Some(b)) => CellValue::Bool(b),
        ScalarValue::Int8(Some(i)) => CellValue::Int(i64::from(i)),
        ScalarValue::Int16(Some(i)) => CellValue::Int(i64::from(i)),
        ScalarValue::Int32(Some(i)) => CellValue::Int(i64::from(i)),
        ScalarValue::Int64(Some(i)) => CellValue::Int(i),
        ScalarValue::UInt8(Some(i)) => CellValue::Int(i64::from(i)),
        ScalarValue::UInt16(Some(i)) => CellValue::Int(i64::from(i)),
        ScalarValue::UInt32(Some(i)) => CellValue::Int(i64::from(i)),
        ScalarValue::UInt64(Some(i)) => match i64::try_from(i) {
            Ok(v) => CellValue::Int(v),
            Err(_) => CellValue::Float(i as f64),
        },
        ScalarValue::Float32(Some(f)) => CellValue::Float(f64::from(f)),
        ScalarValue::Float64(Some(f)) => CellValue::Float(f),
        ScalarValue::Utf8(Some(s))
        | ScalarValue::LargeUtf8(Some(s))
        | ScalarValue::Utf8View(Some(s)) => CellValue::Text(s),
        other => CellValue::Text(other.to_string()),
    }
}

#[async_trait]
impl DataAccessor for DataFusionAccessor {
    async fn count_rows(&self, table: &str) -> Result<u64, AccessorError> {
        Ok(self.frame(table).await?.count().await? as u64)
    }

    async fn count_nulls(&self, table: &str, column: &str) -> Result<u64, AccessorError> {
        let (df, column) = self.frame_with_column(table, column).await?;
        Ok(df.filter(ident(&column).is_null())?.count().await? as u64)
    }

    async fn distinct_count(&self, table: &str, column: &str) -> Result<u64, AccessorError> {
        let (df, column) = self.frame_with_column(table, column).await?;
        let distinct = df
            .select(vec![ident(&column)])?
            .filter(ident(&column).is_not_null())?
            .distinct()?
            .count()
            .await?;
        Ok(distinct as u64)
    }

    async fn distinct_count_compound(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<u64, AccessorError> {
        let mut exprs = Vec::with_capacity(columns.len());
        let mut df = None;
        for column in columns {
            let (frame, name) = self.frame_with_column(table, column).await?;
            exprs.push(ident(name));
            df = Some(frame);
        }
        let Some(df) = df else {
            return Ok(0);
        };
        Ok(df.select(exprs)?.distinct()?.count().await? as u64)
    }

    async fn scan_values(&self, table: &str, column: &str) -> Result<ValueStream, AccessorError> {
        let (df, column) = self.frame_with_column(table, column).await?;
        let batches = df.select(vec![ident(&column)])?.execute_stream().await?;

        Ok(batches
            .map(|batch| match batch {
                Ok(batch) => batch_cells(&batch),
                Err(e) => vec![Err(AccessorError::from(e))],
            })
            .flat_map(futures::stream::iter)
            .boxed())
    }

    async fn column_type(&self, table: &str, column: &str) -> Result<String, AccessorError> {
        let df = self.frame(table).await?;
        df.schema()
            .fields()
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(column))
            .map(|f| f.data_type().to_string())
            .ok_or_else(|| AccessorError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    fn engine_name(&self) -> &str {
        "datafusion"
    }
}
