// expecta-core/src/infrastructure/adapters/memory.rs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use crate::domain::value::CellValue;
use crate::ports::accessor::{AccessorError, DataAccessor, ValueStream};

/// Row-oriented in-memory table. Used by tests and for rule sets evaluated
/// against data that is already loaded.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    name: String,
    columns: Vec<(String, String)>,
    rows: Vec<Vec<CellValue>>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push((name.into(), data_type.into()));
        self
    }

    /// Rows may be shorter than the column list, or added before their
    /// columns; missing cells read as null.
    pub fn row(mut self, values: Vec<CellValue>) -> Self {
        self.rows.push(values);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn column_index(&self, column: &str) -> Result<usize, AccessorError> {
        self.columns
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(column))
            .ok_or_else(|| AccessorError::ColumnNotFound {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    fn values(&self, column: &str) -> Result<impl Iterator<Item = &CellValue>, AccessorError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| cell(row, idx)))
    }
}

fn cell(row: &[CellValue], idx: usize) -> &CellValue {
    row.get(idx).unwrap_or(&CellValue::Null)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryAccessor {
    tables: HashMap<String, Arc<MemoryTable>>,
}

impl MemoryAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: MemoryTable) -> Self {
        self.insert(table);
        self
    }

    pub fn insert(&mut self, table: MemoryTable) {
        self.tables
            .insert(table.name.to_ascii_uppercase(), Arc::new(table));
    }

    fn table(&self, name: &str) -> Result<&Arc<MemoryTable>, AccessorError> {
        self.tables
            .get(&name.to_ascii_uppercase())
            .ok_or_else(|| AccessorError::TableNotFound(name.to_string()))
    }
}

#[async_trait]
impl DataAccessor for MemoryAccessor {
    async fn count_rows(&self, table: &str) -> Result<u64, AccessorError> {
        Ok(self.table(table)?.rows.len() as u64)
    }

    async fn count_nulls(&self, table: &str, column: &str) -> Result<u64, AccessorError> {
        let nulls = self.table(table)?.values(column)?.filter(|v| v.is_null()).count();
        Ok(nulls as u64)
    }

    async fn distinct_count(&self, table: &str, column: &str) -> Result<u64, AccessorError> {
        let distinct: HashSet<String> = self
            .table(table)?
            .values(column)?
            .filter(|v| !v.is_null())
            .map(CellValue::distinct_key)
            .collect();
        Ok(distinct.len() as u64)
    }

    async fn distinct_count_compound(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<u64, AccessorError> {
        let t = self.table(table)?;
        let indices = columns
            .iter()
            .map(|c| t.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;

        let distinct: HashSet<Vec<String>> = t
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| cell(row, i).distinct_key()).collect())
            .collect();
        Ok(distinct.len() as u64)
    }

    async fn scan_values(&self, table: &str, column: &str) -> Result<ValueStream, AccessorError> {
        let values: Vec<CellValue> = self.table(table)?.values(column)?.cloned().collect();
        Ok(futures::stream::iter(values.into_iter().map(Ok)).boxed())
    }

    async fn column_type(&self, table: &str, column: &str) -> Result<String, AccessorError> {
        let t = self.table(table)?;
        let idx = t.column_index(column)?;
        Ok(t.columns[idx].1.clone())
    }

    fn engine_name(&self) -> &str {
        "memory"
    }
}
