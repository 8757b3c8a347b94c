// expecta-core/src/domain/expectation/schema.rs

use std::fmt;

use serde::Serialize;

/// What an expectation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Column,
    MultiColumn,
    Table,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Column => "single-column",
            Scope::MultiColumn => "multi-column",
            Scope::Table => "table",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Number,
    Integer,
    Text,
    Boolean,
    TextList,
    /// Number or string; strings compare lexicographically (ISO dates).
    Bound,
    /// Compiled at bind time.
    Regex,
    /// chrono strftime pattern, validated at bind time.
    DateFormat,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Text => "string",
            ParamType::Boolean => "boolean",
            ParamType::TextList => "list of strings",
            ParamType::Bound => "number or string",
            ParamType::Regex => "regular expression",
            ParamType::DateFormat => "strftime format",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ParamType,
    pub required: bool,
}

/// Named, typed parameters of one expectation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamSchema {
    params: Vec<ParamSpec>,
    any_of: Vec<Vec<String>>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            ty,
            required: true,
        });
        self
    }

    pub fn optional(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            ty,
            required: false,
        });
        self
    }

    /// At least one of `names` must be supplied, even if each is optional.
    pub fn require_any(mut self, names: &[&str]) -> Self {
        self.any_of
            .push(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn any_of(&self) -> &[Vec<String>] {
        &self.any_of
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Display for ParamSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return f.write_str("-");
        }
        let rendered: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                let marker = if p.required { "" } else { "?" };
                format!("{}{}: {}", p.name, marker, p.ty)
            })
            .collect();
        f.write_str(&rendered.join(", "))
    }
}
