// expecta-core/src/infrastructure/config/rules.rs

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::rule::RawRuleRow;
use crate::error::ExpectaError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::rule_source::RuleSource;

/// Either a bare list of rows or `rules: [...]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RuleFile {
    List(Vec<RawRuleRow>),
    Wrapped { rules: Vec<RawRuleRow> },
}

impl RuleFile {
    fn into_rows(self) -> Vec<RawRuleRow> {
        match self {
            RuleFile::List(rows) | RuleFile::Wrapped { rules: rows } => rows,
        }
    }
}

/// Rule rows kept in a YAML or JSON file (picked by extension, YAML otherwise).
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<Vec<RawRuleRow>, InfrastructureError> {
        let is_json = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let file: RuleFile = if is_json {
            serde_json::from_str(content)?
        } else {
            serde_yaml::from_str(content)?
        };
        Ok(file.into_rows())
    }
}

#[async_trait]
impl RuleSource for FileRuleSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_rules(&self) -> Result<Vec<RawRuleRow>, ExpectaError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let rows = self.parse(&content)?;
        info!(count = rows.len(), "Rule rows loaded");
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("file '{}'", self.path.display())
    }
}
