// expecta-core/src/ports/mod.rs

pub mod accessor;
pub mod rule_source;

pub use accessor::{AccessorError, DataAccessor, ValueStream};
pub use rule_source::RuleSource;
