// expecta-core/src/domain/expectation/check.rs

use async_trait::async_trait;

use crate::domain::expectation::binder::BoundParameters;
use crate::error::ExpectaError;
use crate::ports::accessor::DataAccessor;

/// What a check concluded about the data. Errors never end up here:
/// an evaluation that could not run returns `Err` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub passed: bool,
    pub detail: String,
    pub violations: Option<u64>,
    pub sample: Option<String>,
}

impl Verdict {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            passed: true,
            detail: detail.into(),
            violations: None,
            sample: None,
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: detail.into(),
            violations: None,
            sample: None,
        }
    }

    pub fn with_violations(mut self, violations: u64) -> Self {
        self.violations = Some(violations);
        self
    }

    pub fn with_sample(mut self, sample: Option<String>) -> Self {
        self.sample = sample;
        self
    }

    /// Per-row verdict honoring `mostly`. Zero evaluated rows is a vacuous pass.
    pub fn tally(violations: u64, evaluated: u64, mostly: f64, describe: impl FnOnce() -> String) -> Self {
        let passed = conforms(violations, evaluated, mostly);
        let detail = describe();
        let verdict = if passed {
            Verdict::pass(detail)
        } else {
            Verdict::fail(detail)
        };
        verdict.with_violations(violations)
    }
}

fn conforms(violations: u64, evaluated: u64, mostly: f64) -> bool {
    if violations == 0 || evaluated == 0 {
        return true;
    }
    let conforming = evaluated.saturating_sub(violations) as f64 / evaluated as f64;
    conforming >= mostly
}

/// Evaluation logic of one expectation type.
#[async_trait]
pub trait Check: Send + Sync {
    async fn evaluate(
        &self,
        accessor: &dyn DataAccessor,
        params: &BoundParameters,
    ) -> Result<Verdict, ExpectaError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_violations_pass() {
        assert!(Verdict::tally(0, 10, 1.0, String::new).passed);
    }

    #[test]
    fn test_empty_input_is_vacuous_pass() {
        assert!(Verdict::tally(0, 0, 1.0, String::new).passed);
    }

    #[test]
    fn test_any_violation_fails_by_default() {
        let verdict = Verdict::tally(1, 1000, 1.0, || "1 bad".to_string());
        assert!(!verdict.passed);
        assert_eq!(verdict.violations, Some(1));
        assert_eq!(verdict.detail, "1 bad");
    }

    #[test]
    fn test_mostly_tolerates_a_fraction() {
        assert!(Verdict::tally(5, 100, 0.95, String::new).passed);
        assert!(!Verdict::tally(6, 100, 0.95, String::new).passed);
    }
}
