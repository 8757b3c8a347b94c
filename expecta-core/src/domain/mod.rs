pub mod error;
pub mod expectation;
pub mod project;
pub mod report;
pub mod rule;
pub mod value;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::{ConfigError, ErrorKind, RuntimeError};
pub use report::{Outcome, Report, ResultAggregator, RuleResult, Summary};
pub use rule::{LoadedRule, RawRuleRow, RuleIdentity, RuleRecord};
pub use value::CellValue;
