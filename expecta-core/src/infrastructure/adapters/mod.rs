pub mod datafusion;
pub mod duckdb;
pub mod memory;

pub use self::datafusion::DataFusionAccessor;
pub use self::duckdb::{DuckDBAccessor, DuckDBRuleSource};
pub use memory::{MemoryAccessor, MemoryTable};
