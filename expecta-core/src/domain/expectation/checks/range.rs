// expecta-core/src/domain/expectation/checks/range.rs

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::domain::expectation::binder::{BoundParameters, RangeBound};
use crate::domain::expectation::check::{Check, Verdict};
use crate::domain::expectation::checks::{NullPolicy, sample_suffix, scan_column};
use crate::domain::value::CellValue;
use crate::error::ExpectaError;
use crate::ports::accessor::DataAccessor;

/// Nulls are exempt. Numeric bounds compare numerically,
/// text bounds (ISO dates) compare lexicographically.
pub struct BetweenCheck;

#[async_trait]
impl Check for BetweenCheck {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError> {
        let table = params.table();
        let column = params.column()?;
        let min = params.bound("min_value");
        let max = params.bound("max_value");
        let strict_min = params.boolean("strict_min").unwrap_or(false);
        let strict_max = params.boolean("strict_max").unwrap_or(false);

        let tally = scan_column(accessor, table, column, NullPolicy::Skip, |value| {
            let above_min = min.is_none_or(|bound| match compare(value, bound) {
                Some(Ordering::Greater) => true,
                Some(Ordering::Equal) => !strict_min,
                _ => false,
            });
            let below_max = max.is_none_or(|bound| match compare(value, bound) {
                Some(Ordering::Less) => true,
                Some(Ordering::Equal) => !strict_max,
                _ => false,
            });
            above_min && below_max
        })
        .await?;

        let window = describe_window(min, max, strict_min, strict_max);
        Ok(Verdict::tally(tally.violations, tally.evaluated, params.mostly(), || {
            format!(
                "{} of {} non-null values in {table}.{column} outside {window}{}",
                tally.violations,
                tally.evaluated,
                sample_suffix(&tally.sample)
            )
        })
        .with_sample(tally.sample))
    }
}

/// `None` when the value cannot be compared to the bound (e.g. text vs number).
fn compare(value: &CellValue, bound: &RangeBound) -> Option<Ordering> {
    match bound {
        RangeBound::Number(limit) => value.as_f64()?.partial_cmp(limit),
        RangeBound::Text(limit) => Some(value.as_text()?.as_str().cmp(limit.as_str())),
    }
}

fn describe_window(
    min: Option<&RangeBound>,
    max: Option<&RangeBound>,
    strict_min: bool,
    strict_max: bool,
) -> String {
    let open = if strict_min { "(" } else { "[" };
    let close = if strict_max { ")" } else { "]" };
    let lower = min.map(ToString::to_string).unwrap_or_else(|| "-inf".into());
    let upper = max.map(ToString::to_string).unwrap_or_else(|| "+inf".into());
    format!("{open}{lower}, {upper}{close}")
}
