// expecta-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::{Config, Connection, InterruptHandle, params};
use futures::StreamExt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::domain::rule::RawRuleRow;
use crate::domain::value::CellValue;
use crate::error::ExpectaError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::accessor::{AccessorError, DataAccessor, ValueStream};
use crate::ports::rule_source::RuleSource;

pub struct DuckDBAccessor {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBAccessor {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();
        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, InfrastructureError> {
        Self::new(":memory:")
    }

    /// Runs a statement for setup (DDL, inserts). Not used by checks.
    pub fn execute(&self, sql: &str) -> Result<(), InfrastructureError> {
        let conn = self.conn.lock().map_err(|_| {
            InfrastructureError::Io(std::io::Error::other("DuckDB Mutex Poisoned"))
        })?;
        conn.execute_batch(sql)
            .map_err(|e| InfrastructureError::Database(DatabaseError::DuckDB(e)))
    }

    /// Exposes a CSV file as a view named `name`.
    pub fn register_csv(&self, name: &str, path: &Path) -> Result<(), InfrastructureError> {
        let path = path.to_string_lossy().replace('\'', "''");
        debug!(table = name, path = %path, "registering csv source");
        self.execute(&format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM read_csv_auto('{}')",
            quote(name),
            path
        ))
    }

    /// Rule rows stored in `table` of the same database.
    pub fn rule_source(&self, table: impl Into<String>) -> DuckDBRuleSource {
        DuckDBRuleSource {
            conn: Arc::clone(&self.conn),
            table: table.into(),
        }
    }

    /// Runs `work` on the blocking pool against a fresh connection to the
    /// same database. Dropping the returned future interrupts the query.
    async fn blocking<T, F>(&self, work: F) -> Result<T, AccessorError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, AccessorError> + Send + 'static,
    {
        let conn = lock(&self.conn)?.try_clone()?;
        let guard = InterruptOnDrop::new(conn.interrupt_handle());
        let abandoned = Arc::clone(&guard.abandoned);

        let result = tokio::task::spawn_blocking(move || {
            if abandoned.load(Ordering::Acquire) {
                return Err(AccessorError::Backend("query abandoned".into()));
            }
            work(&conn)
        })
        .await
        .map_err(|e| AccessorError::Backend(format!("spawn_blocking failed: {e}")))?;

        guard.disarm();
        result
    }
}

/// Interrupts the in-flight query unless disarmed (the awaiting rule was
/// timed out or cancelled).
struct InterruptOnDrop {
    handle: Arc<InterruptHandle>,
    abandoned: Arc<AtomicBool>,
    armed: bool,
}

impl InterruptOnDrop {
    fn new(handle: Arc<InterruptHandle>) -> Self {
        Self {
            handle,
            abandoned: Arc::new(AtomicBool::new(false)),
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if self.armed {
            debug!("interrupting abandoned duckdb query");
            self.abandoned.store(true, Ordering::Release);
            self.handle.interrupt();
        }
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, AccessorError> {
    conn.lock()
        .map_err(|_| AccessorError::Backend("DuckDB mutex poisoned".into()))
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Column names and declared types, or `TableNotFound`.
fn describe(conn: &Connection, table: &str) -> Result<Vec<(String, String)>, AccessorError> {
    let exists: i64 = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.tables WHERE lower(table_name) = lower(?)",
        params![table],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(AccessorError::TableNotFound(table.to_string()));
    }

    let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM {}", quote(table)))?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}

fn resolve_column(
    conn: &Connection,
    table: &str,
    column: &str,
) -> Result<(String, String), AccessorError> {
    describe(conn, table)?
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(column))
        .ok_or_else(|| AccessorError::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        })
}

fn scalar_count(conn: &Connection, sql: &str) -> Result<u64, AccessorError> {
    let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Engine type mapped onto the four shapes a `CellValue` can carry.
fn scan_cast(data_type: &str) -> &'static str {
    let upper = data_type.to_ascii_uppercase();
    let base = upper.split('(').next().unwrap_or_default().trim();
    match base {
        "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "UTINYINT" | "USMALLINT"
        | "UINTEGER" => "BIGINT",
        "HUGEINT" | "UHUGEINT" | "UBIGINT" | "FLOAT" | "REAL" | "DOUBLE" | "DECIMAL" => "DOUBLE",
        "BOOLEAN" => "BOOLEAN",
        _ => "VARCHAR",
    }
}

fn to_cell(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Boolean(b) => CellValue::Bool(b),
        Value::BigInt(i) => CellValue::Int(i),
        Value::Int(i) => CellValue::Int(i64::from(i)),
        Value::Double(f) => CellValue::Float(f),
        Value::Float(f) => CellValue::Float(f64::from(f)),
        Value::Text(s) => CellValue::Text(s),
        other => CellValue::Text(format!("{other:?}")),
    }
}

#[async_trait]
impl DataAccessor for DuckDBAccessor {
    async fn count_rows(&self, table: &str) -> Result<u64, AccessorError> {
        let table = table.to_string();
        self.blocking(move |conn| {
            describe(conn, &table)?;
            scalar_count(conn, &format!("SELECT COUNT(*) FROM {}", quote(&table)))
        })
        .await
    }

    async fn count_nulls(&self, table: &str, column: &str) -> Result<u64, AccessorError> {
        let (table, column) = (table.to_string(), column.to_string());
        self.blocking(move |conn| {
            let (column, _) = resolve_column(conn, &table, &column)?;
            scalar_count(
                conn,
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE {} IS NULL",
                    quote(&table),
                    quote(&column)
                ),
            )
        })
        .await
    }

    async fn distinct_count(&self, table: &str, column: &str) -> Result<u64, AccessorError> {
        let (table, column) = (table.to_string(), column.to_string());
        self.blocking(move |conn| {
            let (column, _) = resolve_column(conn, &table, &column)?;
            scalar_count(
                conn,
                &format!(
                    "SELECT COUNT(DISTINCT {}) FROM {}",
                    quote(&column),
                    quote(&table)
                ),
            )
        })
        .await
    }

    async fn distinct_count_compound(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<u64, AccessorError> {
        let (table, columns) = (table.to_string(), columns.to_vec());
        self.blocking(move |conn| {
            let mut quoted = Vec::with_capacity(columns.len());
            for column in &columns {
                let (name, _) = resolve_column(conn, &table, column)?;
                quoted.push(quote(&name));
            }
            // SELECT DISTINCT groups nulls together
            scalar_count(
                conn,
                &format!(
                    "SELECT COUNT(*) FROM (SELECT DISTINCT {} FROM {})",
                    quoted.join(", "),
                    quote(&table)
                ),
            )
        })
        .await
    }

    async fn scan_values(&self, table: &str, column: &str) -> Result<ValueStream, AccessorError> {
        let (table, column) = (table.to_string(), column.to_string());
        let values = self
            .blocking(move |conn| {
                let (column, data_type) = resolve_column(conn, &table, &column)?;
                let sql = format!(
                    "SELECT CAST({} AS {}) FROM {}",
                    quote(&column),
                    scan_cast(&data_type),
                    quote(&table)
                );

                // Rows borrow the statement, so the column is materialized before streaming.
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], |row| row.get::<_, Value>(0))?;
                let mut values = Vec::new();
                for row in rows {
                    values.push(to_cell(row?));
                }
                Ok(values)
            })
            .await?;
        Ok(futures::stream::iter(values.into_iter().map(Ok)).boxed())
    }

    async fn column_type(&self, table: &str, column: &str) -> Result<String, AccessorError> {
        let (table, column) = (table.to_string(), column.to_string());
        self.blocking(move |conn| Ok(resolve_column(conn, &table, &column)?.1))
            .await
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

/// Reads rule rows from a validation config table:
/// `table_name, column_name, expectation_type, params_json, is_enabled`.
pub struct DuckDBRuleSource {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

#[async_trait]
impl RuleSource for DuckDBRuleSource {
    async fn fetch_rules(&self) -> Result<Vec<RawRuleRow>, ExpectaError> {
        let conn = lock(&self.conn)?;
        describe(&conn, &self.table)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT table_name, column_name, expectation_type, params_json, is_enabled FROM {}",
                quote(&self.table)
            ))
            .map_err(InfrastructureError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RawRuleRow {
                    table_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    column_name: row.get(1)?,
                    expectation_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    params_json: row.get(3)?,
                    params: None,
                    is_enabled: row.get::<_, Option<bool>>(4)?.unwrap_or(true),
                })
            })
            .map_err(InfrastructureError::from)?;

        let mut rules = Vec::new();
        for row in rows {
            rules.push(row.map_err(InfrastructureError::from)?);
        }
        debug!(table = %self.table, count = rules.len(), "fetched rule rows");
        Ok(rules)
    }

    fn describe(&self) -> String {
        format!("duckdb table '{}'", self.table)
    }
}
