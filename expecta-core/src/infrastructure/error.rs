// expecta-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

use crate::ports::accessor::AccessorError;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(expecta::infra::database::duckdb),
        help("An error occurred inside the SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("DataFusion Engine Error: {0}")]
    #[diagnostic(
        code(expecta::infra::database::datafusion),
        help("Check that the registered sources exist and are readable.")
    )]
    DataFusion(#[from] datafusion::error::DataFusionError),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(expecta::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML / JSON ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(expecta::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(expecta::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(expecta::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(
        code(expecta::infra::config_missing),
        help("Create an expecta.yaml at the project root.")
    )]
    ConfigNotFound(String),

    #[error("Invalid project configuration: {0}")]
    #[diagnostic(code(expecta::infra::config_invalid))]
    InvalidConfig(#[from] validator::ValidationErrors),
}

impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl From<datafusion::error::DataFusionError> for InfrastructureError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        InfrastructureError::Database(DatabaseError::DataFusion(err))
    }
}

// Checks only see AccessorError; engine failures are flattened to text there.
impl From<DatabaseError> for AccessorError {
    fn from(err: DatabaseError) -> Self {
        AccessorError::Backend(err.to_string())
    }
}

impl From<duckdb::Error> for AccessorError {
    fn from(err: duckdb::Error) -> Self {
        AccessorError::Backend(err.to_string())
    }
}

impl From<datafusion::error::DataFusionError> for AccessorError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        AccessorError::Backend(err.to_string())
    }
}
