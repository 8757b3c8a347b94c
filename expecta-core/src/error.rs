// expecta-core/src/error.rs

use crate::domain::error::{ConfigError, ErrorKind, RuntimeError};
use crate::infrastructure::error::InfrastructureError;
use crate::ports::accessor::AccessorError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ExpectaError {
    // --- ERREURS DE CONFIGURATION (lignes de règles, registre) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    // --- ERREURS D'EXÉCUTION (registre gelé, accessor, annulation) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),

    // --- ERREURS D'INFRASTRUCTURE (IO, Parsing, Database) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

impl From<std::io::Error> for ExpectaError {
    fn from(err: std::io::Error) -> Self {
        ExpectaError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<AccessorError> for ExpectaError {
    fn from(err: AccessorError) -> Self {
        ExpectaError::Runtime(RuntimeError::Accessor(err))
    }
}

impl ExpectaError {
    /// Classification used when the error ends a single rule as ERRORED.
    /// Engine and IO failures surface through an accessor, so they count as such.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExpectaError::Config(e) => e.kind(),
            ExpectaError::Runtime(e) => e.kind(),
            ExpectaError::Infrastructure(_) => ErrorKind::Accessor,
        }
    }
}
