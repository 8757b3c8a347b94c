// expecta-core/src/domain/rule.rs

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::ConfigError;

/// One row of the validation config store, as read.
///
/// `params` lets file-based sources write the payload as a mapping;
/// table-based sources fill `params_json` with the raw JSON text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawRuleRow {
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub expectation_type: String,
    #[serde(default)]
    pub params_json: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl RawRuleRow {
    pub fn new(
        table_name: impl Into<String>,
        column_name: Option<&str>,
        expectation_type: impl Into<String>,
        params_json: Option<&str>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.map(str::to_string),
            expectation_type: expectation_type.into(),
            params_json: params_json.map(str::to_string),
            params: None,
            is_enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}

/// Who a result is about. Shared by the rule and its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleIdentity {
    pub index: usize,
    pub table: String,
    pub column: Option<String>,
    pub expectation_type: String,
}

impl fmt::Display for RuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = if self.table.is_empty() {
            "<no table>"
        } else {
            &self.table
        };
        match &self.column {
            Some(column) => write!(
                f,
                "#{} {}.{} [{}]",
                self.index, table, column, self.expectation_type
            ),
            None => write!(f, "#{} {} [{}]", self.index, table, self.expectation_type),
        }
    }
}

/// A parsed, immutable rule. Fields are private: nothing mutates a record after parsing.
#[derive(Debug, Clone)]
pub struct RuleRecord {
    identity: Arc<RuleIdentity>,
    params: Option<Value>,
    enabled: bool,
}

impl RuleRecord {
    pub fn parse(index: usize, row: &RawRuleRow) -> Result<Self, ConfigError> {
        let identity = Arc::new(identity_of(index, row));
        Self::parse_with_identity(identity, row)
    }

    fn parse_with_identity(
        identity: Arc<RuleIdentity>,
        row: &RawRuleRow,
    ) -> Result<Self, ConfigError> {
        if identity.table.is_empty() {
            return Err(ConfigError::MissingTable {
                rule: identity.to_string(),
            });
        }

        if identity.expectation_type.is_empty() {
            return Err(ConfigError::UnknownExpectation {
                rule: identity.to_string(),
                name: String::new(),
            });
        }

        let params = match (&row.params, non_blank(row.params_json.as_deref())) {
            (Some(Value::Null), _) => None,
            (Some(structured), _) => Some(structured.clone()),
            (None, Some(raw)) => parse_params_json(&identity, raw)?,
            (None, None) => None,
        };

        Ok(Self {
            identity,
            params,
            enabled: row.is_enabled,
        })
    }

    pub fn identity(&self) -> &Arc<RuleIdentity> {
        &self.identity
    }

    pub fn table(&self) -> &str {
        &self.identity.table
    }

    pub fn column(&self) -> Option<&str> {
        self.identity.column.as_deref()
    }

    pub fn expectation_type(&self) -> &str {
        &self.identity.expectation_type
    }

    /// `None` means no payload at all (empty params).
    pub fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Result of loading one row: the record, or the reason it could not be built.
/// Bad rows stay in the sequence so the report can account for them.
#[derive(Debug, Clone)]
pub struct LoadedRule {
    pub identity: Arc<RuleIdentity>,
    pub enabled: bool,
    pub record: Result<RuleRecord, ConfigError>,
}

impl LoadedRule {
    pub fn from_row(index: usize, row: &RawRuleRow) -> Self {
        let identity = Arc::new(identity_of(index, row));
        let record = RuleRecord::parse_with_identity(identity.clone(), row);
        Self {
            identity,
            enabled: row.is_enabled,
            record,
        }
    }
}

fn identity_of(index: usize, row: &RawRuleRow) -> RuleIdentity {
    RuleIdentity {
        index,
        table: row.table_name.trim().to_string(),
        column: non_blank(row.column_name.as_deref()).map(str::to_string),
        expectation_type: row.expectation_type.trim().to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_params_json(identity: &RuleIdentity, raw: &str) -> Result<Option<Value>, ConfigError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(ConfigError::MalformedParams {
            rule: identity.to_string(),
            payload: raw.to_string(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }),
    }
}
