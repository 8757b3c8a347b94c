// expecta-core/src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

/// Engine that hosts the data the rules are checked against.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    DuckDB,
    DataFusion,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub engine: Engine,

    /// DuckDB database file; ignored by DataFusion.
    #[serde(default = "default_database")]
    pub database: String,

    /// Table name -> CSV path, registered before the run.
    #[serde(default)]
    pub sources: BTreeMap<String, String>,

    #[validate(nested)]
    pub rules: RulesConfig,

    #[serde(rename = "max-workers", default = "default_max_workers")]
    #[validate(range(min = 1, max = 256))]
    pub max_workers: usize,

    #[serde(rename = "deadline-secs", default)]
    #[validate(range(min = 1))]
    pub deadline_secs: Option<u64>,

    #[serde(rename = "rule-timeout-secs", default)]
    #[validate(range(min = 1))]
    pub rule_timeout_secs: Option<u64>,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,
}

/// Where rule rows are read from. Exactly one of the two.
#[derive(Debug, Deserialize, Serialize, Clone, Default, Validate)]
#[validate(schema(function = "exactly_one_rule_source"))]
pub struct RulesConfig {
    pub file: Option<String>,
    pub table: Option<String>,
}

fn exactly_one_rule_source(rules: &RulesConfig) -> Result<(), ValidationError> {
    match (&rules.file, &rules.table) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => Err(ValidationError::new("rules")
            .with_message("set exactly one of rules.file or rules.table".into())),
    }
}

fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_database() -> String {
    "expecta.duckdb".to_string()
}
fn default_max_workers() -> usize {
    8
}
fn default_target_path() -> String {
    "target".to_string()
}
