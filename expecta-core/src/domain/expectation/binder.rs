// expecta-core/src/domain/expectation/binder.rs

// Single crossing point between the untyped params payload and the checks.
// Everything downstream only sees `BoundParameters`.

use std::collections::BTreeMap;

use chrono::format::{Item, StrftimeItems};
use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::error::ConfigError;
use crate::domain::expectation::registry::ExpectationDescriptor;
use crate::domain::expectation::schema::{ParamSpec, ParamType, Scope};
use crate::domain::rule::RuleRecord;

/// Parameters every expectation accepts on top of its own schema.
pub const MOSTLY: &str = "mostly";
pub const RESULT_FORMAT: &str = "result_format";
pub const COLUMN_LIST: &str = "column_list";

#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for RangeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeBound::Number(n) => write!(f, "{n}"),
            RangeBound::Text(s) => write!(f, "'{s}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ParamValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Boolean(bool),
    TextList(Vec<String>),
    Bound(RangeBound),
    Regex(Regex),
}

/// What the rule points at, already checked against the expectation scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Column { table: String, column: String },
    Columns { table: String, columns: Vec<String> },
    Table { table: String },
}

impl Target {
    pub fn table(&self) -> &str {
        match self {
            Target::Column { table, .. }
            | Target::Columns { table, .. }
            | Target::Table { table } => table,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Column { table, column } => write!(f, "{table}.{column}"),
            Target::Columns { table, columns } => write!(f, "{table}({})", columns.join(", ")),
            Target::Table { table } => write!(f, "{table}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoundParameters {
    expectation: String,
    target: Target,
    values: BTreeMap<String, ParamValue>,
    mostly: f64,
    ignored: Vec<String>,
}

impl BoundParameters {
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn table(&self) -> &str {
        self.target.table()
    }

    pub fn column(&self) -> Result<&str, ConfigError> {
        match &self.target {
            Target::Column { column, .. } => Ok(column),
            _ => Err(self.scope_error(Scope::Column, "no single column bound")),
        }
    }

    pub fn columns(&self) -> Result<&[String], ConfigError> {
        match &self.target {
            Target::Columns { columns, .. } => Ok(columns),
            _ => Err(self.scope_error(Scope::MultiColumn, "no column list bound")),
        }
    }

    /// Fraction of rows that must conform, 1.0 unless configured.
    pub fn mostly(&self) -> f64 {
        self.mostly
    }

    /// Keys present in the payload that no schema declared.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn text_list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name)? {
            ParamValue::TextList(list) => Some(list),
            _ => None,
        }
    }

    pub fn bound(&self, name: &str) -> Option<&RangeBound> {
        match self.values.get(name)? {
            ParamValue::Bound(b) => Some(b),
            _ => None,
        }
    }

    pub fn regex(&self, name: &str) -> Option<&Regex> {
        match self.values.get(name)? {
            ParamValue::Regex(r) => Some(r),
            _ => None,
        }
    }

    fn scope_error(&self, scope: Scope, reason: &str) -> ConfigError {
        ConfigError::ScopeMismatch {
            expectation: self.expectation.clone(),
            scope: scope.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Turns an optional lookup into a `MissingParameter` error.
pub fn required<T>(name: &str, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingParameter(name.to_string()))
}

/// Applies the descriptor's schema to the rule payload. Pure: never touches data.
pub fn bind(
    descriptor: &ExpectationDescriptor,
    rule: &RuleRecord,
) -> Result<BoundParameters, ConfigError> {
    let empty = Map::new();
    let raw = match rule.params() {
        None => &empty,
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(ConfigError::TypeMismatch {
                name: "params".to_string(),
                expected: "object".to_string(),
                actual: json_type_name(other).to_string(),
            });
        }
    };

    let mostly = match present(raw, MOSTLY) {
        None => 1.0,
        Some(value) => match value.as_f64() {
            Some(m) if (0.0..=1.0).contains(&m) => m,
            _ => {
                return Err(ConfigError::TypeMismatch {
                    name: MOSTLY.to_string(),
                    expected: "number between 0 and 1".to_string(),
                    actual: value.to_string(),
                });
            }
        },
    };

    let mut values = BTreeMap::new();
    for spec in descriptor.schema().iter() {
        match present(raw, &spec.name) {
            Some(value) => {
                values.insert(spec.name.clone(), convert(spec, value)?);
            }
            None if spec.required => {
                return Err(ConfigError::MissingParameter(spec.name.clone()));
            }
            None => {}
        }
    }

    for group in descriptor.schema().any_of() {
        if !group.iter().any(|name| values.contains_key(name)) {
            return Err(ConfigError::MissingParameter(group.join(" or ")));
        }
    }

    let ignored: Vec<String> = raw
        .keys()
        .filter(|k| {
            descriptor.schema().get(k).is_none()
                && k.as_str() != MOSTLY
                && k.as_str() != RESULT_FORMAT
        })
        .cloned()
        .collect();

    let target = resolve_target(descriptor, rule, &values)?;

    Ok(BoundParameters {
        expectation: descriptor.name().to_string(),
        target,
        values,
        mostly,
        ignored,
    })
}

fn resolve_target(
    descriptor: &ExpectationDescriptor,
    rule: &RuleRecord,
    values: &BTreeMap<String, ParamValue>,
) -> Result<Target, ConfigError> {
    let table = rule.table().to_string();
    match descriptor.scope() {
        Scope::Column => match rule.column() {
            Some(column) => Ok(Target::Column {
                table,
                column: column.to_string(),
            }),
            None => Err(ConfigError::ScopeMismatch {
                expectation: descriptor.name().to_string(),
                scope: Scope::Column.to_string(),
                reason: "rule has no column_name".to_string(),
            }),
        },
        Scope::MultiColumn => match values.get(COLUMN_LIST) {
            Some(ParamValue::TextList(columns)) if !columns.is_empty() => Ok(Target::Columns {
                table,
                columns: columns.clone(),
            }),
            Some(_) => Err(ConfigError::TypeMismatch {
                name: COLUMN_LIST.to_string(),
                expected: "non-empty list of strings".to_string(),
                actual: "empty list".to_string(),
            }),
            None => Err(ConfigError::MissingParameter(COLUMN_LIST.to_string())),
        },
        Scope::Table => Ok(Target::Table { table }),
    }
}

/// A JSON null is the same as an absent key.
fn present<'a>(raw: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    raw.get(name).filter(|v| !v.is_null())
}

fn convert(spec: &ParamSpec, value: &Value) -> Result<ParamValue, ConfigError> {
    let mismatch = || ConfigError::TypeMismatch {
        name: spec.name.clone(),
        expected: spec.ty.to_string(),
        actual: json_type_name(value).to_string(),
    };

    match spec.ty {
        ParamType::Number => value.as_f64().map(ParamValue::Number).ok_or_else(mismatch),
        ParamType::Integer => match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(ParamValue::Integer)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ParamType::Text => value
            .as_str()
            .map(|s| ParamValue::Text(s.to_string()))
            .ok_or_else(mismatch),
        ParamType::Boolean => value.as_bool().map(ParamValue::Boolean).ok_or_else(mismatch),
        ParamType::TextList => match value {
            Value::Array(items) => items
                .iter()
                .map(render_scalar)
                .collect::<Option<Vec<String>>>()
                .map(ParamValue::TextList)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ParamType::Bound => match value {
            Value::Number(n) => n
                .as_f64()
                .map(|f| ParamValue::Bound(RangeBound::Number(f)))
                .ok_or_else(mismatch),
            Value::String(s) => Ok(ParamValue::Bound(RangeBound::Text(s.clone()))),
            _ => Err(mismatch()),
        },
        ParamType::Regex => {
            let pattern = value.as_str().ok_or_else(mismatch)?;
            Regex::new(pattern)
                .map(ParamValue::Regex)
                .map_err(|e| ConfigError::TypeMismatch {
                    name: spec.name.clone(),
                    expected: spec.ty.to_string(),
                    actual: format!("'{pattern}' ({e})"),
                })
        }
        ParamType::DateFormat => {
            let format = value.as_str().ok_or_else(mismatch)?;
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(ConfigError::TypeMismatch {
                    name: spec.name.clone(),
                    expected: spec.ty.to_string(),
                    actual: format!("'{format}'"),
                });
            }
            Ok(ParamValue::Text(format.to_string()))
        }
    }
}

/// Set members may be written as numbers or booleans; they compare as text.
fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => n.as_f64().map(|f| f.to_string()),
        },
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
