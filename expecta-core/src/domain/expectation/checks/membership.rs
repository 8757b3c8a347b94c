// expecta-core/src/domain/expectation/checks/membership.rs

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::expectation::binder::{BoundParameters, required};
use crate::domain::expectation::check::{Check, Verdict};
use crate::domain::expectation::checks::{NullPolicy, sample_suffix, scan_column};
use crate::error::ExpectaError;
use crate::ports::accessor::DataAccessor;

/// Values are compared by their text rendering, nulls are exempt.
pub struct InSetCheck;

#[async_trait]
impl Check for InSetCheck {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError> {
        let table = params.table();
        let column = params.column()?;
        let allowed: HashSet<&str> = required("value_set", params.text_list("value_set"))?
            .iter()
            .map(String::as_str)
            .collect();

        let tally = scan_column(accessor, table, column, NullPolicy::Skip, |value| {
            value
                .as_text()
                .is_some_and(|text| allowed.contains(text.as_str()))
        })
        .await?;

        Ok(Verdict::tally(tally.violations, tally.evaluated, params.mostly(), || {
            format!(
                "{} of {} non-null values in {table}.{column} outside the allowed set of {}{}",
                tally.violations,
                tally.evaluated,
                allowed.len(),
                sample_suffix(&tally.sample)
            )
        })
        .with_sample(tally.sample))
    }
}
