// expecta-core/src/domain/error.rs

use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::accessor::AccessorError;

/// Always attributable to configuration, never to data.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Rule {rule}: table_name is empty")]
    #[diagnostic(code(expecta::config::missing_table))]
    MissingTable { rule: String },

    #[error("Rule {rule}: unknown expectation '{name}'")]
    #[diagnostic(
        code(expecta::config::unknown_expectation),
        help("Run `expecta expectations` to list the registered expectation types.")
    )]
    UnknownExpectation { rule: String, name: String },

    #[error("Rule {rule}: malformed params_json at line {line}, column {column}: {message} (payload: {payload})")]
    #[diagnostic(
        code(expecta::config::malformed_params),
        help("params_json must be valid JSON, e.g. {{\"min_value\": 0}}.")
    )]
    MalformedParams {
        rule: String,
        payload: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Missing required parameter '{0}'")]
    #[diagnostic(code(expecta::config::missing_parameter))]
    MissingParameter(String),

    #[error("Parameter '{name}' expected {expected}, got {actual}")]
    #[diagnostic(code(expecta::config::type_mismatch))]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Expectation '{expectation}' has {scope} scope: {reason}")]
    #[diagnostic(code(expecta::config::scope_mismatch))]
    ScopeMismatch {
        expectation: String,
        scope: String,
        reason: String,
    },

    #[error("Expectation '{0}' is already registered")]
    #[diagnostic(code(expecta::config::duplicate_expectation))]
    DuplicateExpectation(String),
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Expectation '{0}' is not registered")]
    #[diagnostic(code(expecta::runtime::unknown_expectation))]
    UnknownExpectation(String),

    #[error("Registry is frozen, cannot register '{0}' once a run has started")]
    #[diagnostic(code(expecta::runtime::registry_frozen))]
    RegistryFrozen(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Accessor(#[from] AccessorError),

    #[error("Evaluation timed out after {0:.2?}")]
    #[diagnostic(code(expecta::runtime::timeout))]
    Timeout(Duration),

    #[error("cancelled: {0}")]
    #[diagnostic(code(expecta::runtime::cancelled))]
    Cancelled(String),
}

/// Machine-readable classification carried by ERRORED results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingTable,
    UnknownExpectation,
    MalformedParams,
    MissingParameter,
    TypeMismatch,
    ScopeMismatch,
    DuplicateExpectation,
    RegistryFrozen,
    Accessor,
    Timeout,
    Cancelled,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::MissingTable { .. } => ErrorKind::MissingTable,
            ConfigError::UnknownExpectation { .. } => ErrorKind::UnknownExpectation,
            ConfigError::MalformedParams { .. } => ErrorKind::MalformedParams,
            ConfigError::MissingParameter(_) => ErrorKind::MissingParameter,
            ConfigError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ConfigError::ScopeMismatch { .. } => ErrorKind::ScopeMismatch,
            ConfigError::DuplicateExpectation(_) => ErrorKind::DuplicateExpectation,
        }
    }
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::UnknownExpectation(_) => ErrorKind::UnknownExpectation,
            RuntimeError::RegistryFrozen(_) => ErrorKind::RegistryFrozen,
            RuntimeError::Accessor(_) => ErrorKind::Accessor,
            RuntimeError::Timeout(_) => ErrorKind::Timeout,
            RuntimeError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}
