// expecta-core/src/domain/expectation/checks/nullity.rs

use async_trait::async_trait;

use crate::domain::expectation::binder::BoundParameters;
use crate::domain::expectation::check::{Check, Verdict};
use crate::error::ExpectaError;
use crate::ports::accessor::DataAccessor;

pub struct NotNullCheck;

#[async_trait]
impl Check for NotNullCheck {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError> {
        let table = params.table();
        let column = params.column()?;

        let rows = accessor.count_rows(table).await?;
        let nulls = accessor.count_nulls(table, column).await?;

        Ok(Verdict::tally(nulls, rows, params.mostly(), || {
            format!("{nulls} of {rows} rows in {table}.{column} are null")
        }))
    }
}
