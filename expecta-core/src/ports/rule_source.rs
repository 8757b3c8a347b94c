// expecta-core/src/ports/rule_source.rs

use async_trait::async_trait;

use crate::domain::rule::RawRuleRow;
use crate::error::ExpectaError;

/// Where rule rows come from (config table, YAML file...).
/// Rows are returned in store order; the report keeps that order.
#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn fetch_rules(&self) -> Result<Vec<RawRuleRow>, ExpectaError>;

    fn describe(&self) -> String;
}
