// expecta-core/src/domain/expectation/checks/mod.rs

pub mod membership;
pub mod nullity;
pub mod pattern;
pub mod range;
pub mod types;
pub mod uniqueness;
pub mod volume;

use std::sync::Arc;

use futures::StreamExt;

use crate::domain::expectation::registry::ExpectationDescriptor;
use crate::domain::expectation::schema::{ParamSchema, ParamType, Scope};
use crate::domain::value::CellValue;
use crate::ports::accessor::{AccessorError, DataAccessor};

pub use membership::InSetCheck;
pub use nullity::NotNullCheck;
pub use pattern::{RegexCheck, StrftimeCheck};
pub use range::BetweenCheck;
pub use types::TypeCheck;
pub use uniqueness::{CompoundUniqueCheck, UniqueCheck};
pub use volume::RowCountCheck;

/// The fixed catalog registered at process start.
pub fn builtin_descriptors() -> Vec<ExpectationDescriptor> {
    vec![
        ExpectationDescriptor::new(
            "expect_column_values_to_not_be_null",
            Scope::Column,
            ParamSchema::new(),
            Arc::new(NotNullCheck),
        )
        .with_description("Column contains no null values"),
        ExpectationDescriptor::new(
            "expect_column_values_to_be_unique",
            Scope::Column,
            ParamSchema::new(),
            Arc::new(UniqueCheck),
        )
        .with_description("Every row holds a distinct value"),
        ExpectationDescriptor::new(
            "expect_column_values_to_match_regex",
            Scope::Column,
            ParamSchema::new().required("regex", ParamType::Regex),
            Arc::new(RegexCheck),
        )
        .with_description("Values match a regular expression (null is a violation)"),
        ExpectationDescriptor::new(
            "expect_column_values_to_be_between",
            Scope::Column,
            ParamSchema::new()
                .optional("min_value", ParamType::Bound)
                .optional("max_value", ParamType::Bound)
                .optional("strict_min", ParamType::Boolean)
                .optional("strict_max", ParamType::Boolean)
                .require_any(&["min_value", "max_value"]),
            Arc::new(BetweenCheck),
        )
        .with_description("Non-null values fall within [min_value, max_value]"),
        ExpectationDescriptor::new(
            "expect_column_values_to_be_in_set",
            Scope::Column,
            ParamSchema::new().required("value_set", ParamType::TextList),
            Arc::new(InSetCheck),
        )
        .with_description("Non-null values belong to value_set"),
        ExpectationDescriptor::new(
            "expect_column_values_to_match_strftime_format",
            Scope::Column,
            ParamSchema::new().required("strftime_format", ParamType::DateFormat),
            Arc::new(StrftimeCheck),
        )
        .with_description("Values parse under a strftime format (null is a violation)"),
        ExpectationDescriptor::new(
            "expect_column_values_to_be_of_type",
            Scope::Column,
            ParamSchema::new().required("type_", ParamType::Text),
            Arc::new(TypeCheck),
        )
        .with_description("Declared column type equals type_"),
        ExpectationDescriptor::new(
            "expect_compound_columns_to_be_unique",
            Scope::MultiColumn,
            ParamSchema::new().required("column_list", ParamType::TextList),
            Arc::new(CompoundUniqueCheck),
        )
        .with_description("Combination of column_list values is unique per row"),
        ExpectationDescriptor::new(
            "expect_table_row_count_to_be_between",
            Scope::Table,
            ParamSchema::new()
                .optional("min_value", ParamType::Integer)
                .optional("max_value", ParamType::Integer)
                .require_any(&["min_value", "max_value"]),
            Arc::new(RowCountCheck),
        )
        .with_description("Table row count falls within [min_value, max_value]"),
    ]
}

/// Outcome of a full column scan against a per-value predicate.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct ScanTally {
    pub evaluated: u64,
    pub violations: u64,
    pub sample: Option<String>,
}

/// How a scan treats nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NullPolicy {
    /// Nulls are not evaluated at all.
    Skip,
    /// Nulls count as violations.
    Violate,
}

/// Streams the column once and counts values for which `is_valid` is false.
pub(crate) async fn scan_column<F>(
    accessor: &dyn DataAccessor,
    table: &str,
    column: &str,
    nulls: NullPolicy,
    is_valid: F,
) -> Result<ScanTally, AccessorError>
where
    F: Fn(&CellValue) -> bool + Send,
{
    let mut stream = accessor.scan_values(table, column).await?;
    let mut tally = ScanTally::default();

    while let Some(value) = stream.next().await {
        let value = value?;
        let valid = match (&value, nulls) {
            (CellValue::Null, NullPolicy::Skip) => continue,
            (CellValue::Null, NullPolicy::Violate) => false,
            (other, _) => is_valid(other),
        };
        tally.evaluated += 1;
        if !valid {
            tally.violations += 1;
            if tally.sample.is_none() {
                tally.sample = Some(value.to_string());
            }
        }
    }

    Ok(tally)
}

pub(crate) fn sample_suffix(sample: &Option<String>) -> String {
    match sample {
        Some(s) => format!(" (sample: {s})"),
        None => String::new(),
    }
}
