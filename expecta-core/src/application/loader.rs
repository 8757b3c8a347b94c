// expecta-core/src/application/loader.rs

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::error::ConfigError;
use crate::domain::expectation::binder::bind;
use crate::domain::expectation::registry::ExpectationRegistry;
use crate::domain::rule::{LoadedRule, RawRuleRow, RuleIdentity};

/// Parses every row, keeping bad ones as `Err` records in place.
/// With a registry, unknown expectation names are reported here rather than at run time.
pub fn load_rules(rows: &[RawRuleRow], registry: Option<&ExpectationRegistry>) -> Vec<LoadedRule> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let mut loaded = LoadedRule::from_row(index, row);
            let unknown = match (registry, &loaded.record) {
                (Some(registry), Ok(record)) if !registry.contains(record.expectation_type()) => {
                    Some(record.expectation_type().to_string())
                }
                _ => None,
            };
            if let Some(name) = unknown {
                loaded.record = Err(ConfigError::UnknownExpectation {
                    rule: loaded.identity.to_string(),
                    name,
                });
            }
            match &loaded.record {
                Ok(_) => debug!(rule = %loaded.identity, "rule loaded"),
                Err(e) => warn!(rule = %loaded.identity, error = %e, "rule failed to load"),
            }
            loaded
        })
        .collect()
}

/// Dry run of resolve + bind for every rule, disabled ones included.
/// Returns the configuration problems found, in rule order. Never reads data.
pub fn check_rules(
    rules: &[LoadedRule],
    registry: &ExpectationRegistry,
) -> Vec<(Arc<RuleIdentity>, ConfigError)> {
    rules
        .iter()
        .filter_map(|rule| {
            let problem = match &rule.record {
                Err(e) => Some(e.clone()),
                Ok(record) => match registry.resolve(record.expectation_type()) {
                    Ok(descriptor) => bind(&descriptor, record).err(),
                    Err(_) => Some(ConfigError::UnknownExpectation {
                        rule: rule.identity.to_string(),
                        name: record.expectation_type().to_string(),
                    }),
                },
            };
            problem.map(|e| (Arc::clone(&rule.identity), e))
        })
        .collect()
}

/// Keeps rows targeting `table` (case-insensitive), preserving order.
pub fn filter_table(rows: Vec<RawRuleRow>, table: Option<&str>) -> Vec<RawRuleRow> {
    match table {
        None => rows,
        Some(table) => rows
            .into_iter()
            .filter(|row| row.table_name.trim().eq_ignore_ascii_case(table))
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    fn rows() -> Vec<RawRuleRow> {
        vec![
            RawRuleRow::new("ORDERS", Some("ID"), "expect_column_values_to_be_unique", None),
            RawRuleRow::new("ORDERS", Some("ID"), "expect_column_to_be_awesome", None),
            RawRuleRow::new("", Some("ID"), "expect_column_values_to_be_unique", None),
            RawRuleRow::new("customers", Some("EMAIL"), "expect_column_values_to_not_be_null", None),
        ]
    }

    #[test]
    fn test_errors_stay_in_place() {
        let registry = ExpectationRegistry::builtin();
        let loaded = load_rules(&rows(), Some(&registry));
        assert_eq!(loaded.len(), 4);
        assert!(loaded[0].record.is_ok());
        assert_eq!(
            loaded[1].record.as_ref().unwrap_err().kind(),
            ErrorKind::UnknownExpectation
        );
        assert_eq!(loaded[2].record.as_ref().unwrap_err().kind(), ErrorKind::MissingTable);
        assert_eq!(loaded[3].identity.index, 3);
    }

    #[test]
    fn test_without_registry_names_are_not_checked() {
        let loaded = load_rules(&rows(), None);
        assert!(loaded[1].record.is_ok());
    }

    #[test]
    fn test_check_rules_reports_bind_errors() {
        let registry = ExpectationRegistry::builtin();
        let mut all = rows();
        all.push(RawRuleRow::new(
            "ORDERS",
            Some("AMOUNT"),
            "expect_column_values_to_be_between",
            Some(r#"{"strict_min": true}"#),
        ));
        all.push(
            RawRuleRow::new("ORDERS", None, "expect_column_values_to_not_be_null", None).disabled(),
        );
        let problems = check_rules(&load_rules(&all, Some(&registry)), &registry);
        let kinds: Vec<(usize, ErrorKind)> = problems.iter().map(|(id, e)| (id.index, e.kind())).collect();
        assert_eq!(
            kinds,
            vec![
                (1, ErrorKind::UnknownExpectation),
                (2, ErrorKind::MissingTable),
                (4, ErrorKind::MissingParameter),
                (5, ErrorKind::ScopeMismatch),
            ]
        );
    }

    #[test]
    fn test_filter_table() {
        let kept = filter_table(rows(), Some("CUSTOMERS"));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].table_name, "customers");
        assert_eq!(filter_table(rows(), None).len(), 4);
    }
}
