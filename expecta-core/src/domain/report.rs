// expecta-core/src/domain/report.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::ErrorKind;
use crate::domain::expectation::check::Verdict;
use crate::domain::rule::RuleIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
    Errored,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed => "FAILED",
            Outcome::Skipped => "SKIPPED",
            Outcome::Errored => "ERRORED",
        };
        f.write_str(label)
    }
}

/// Verdict for one rule. Immutable once built.
#[derive(Debug, Clone)]
pub struct RuleResult {
    pub rule: Arc<RuleIdentity>,
    pub outcome: Outcome,
    pub detail: String,
    pub elapsed: Duration,
    pub error_kind: Option<ErrorKind>,
    pub violations: Option<u64>,
    pub sample: Option<String>,
    pub warnings: Vec<String>,
}

impl RuleResult {
    pub fn skipped(rule: Arc<RuleIdentity>) -> Self {
        Self {
            rule,
            outcome: Outcome::Skipped,
            detail: "rule disabled".to_string(),
            elapsed: Duration::ZERO,
            error_kind: None,
            violations: None,
            sample: None,
            warnings: Vec::new(),
        }
    }

    pub fn errored(
        rule: Arc<RuleIdentity>,
        kind: ErrorKind,
        detail: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            rule,
            outcome: Outcome::Errored,
            detail: detail.into(),
            elapsed,
            error_kind: Some(kind),
            violations: None,
            sample: None,
            warnings: Vec::new(),
        }
    }

    pub fn from_verdict(
        rule: Arc<RuleIdentity>,
        verdict: Verdict,
        warnings: Vec<String>,
        elapsed: Duration,
    ) -> Self {
        let detail = if warnings.is_empty() {
            verdict.detail
        } else {
            format!("{} [warning: {}]", verdict.detail, warnings.join("; "))
        };
        Self {
            rule,
            outcome: if verdict.passed {
                Outcome::Passed
            } else {
                Outcome::Failed
            },
            detail,
            elapsed,
            error_kind: None,
            violations: verdict.violations,
            sample: verdict.sample,
            warnings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errored: usize,
    pub status: Outcome,
    /// Status per target table, escalated the same way as the run status.
    pub tables: BTreeMap<String, Outcome>,
}

impl Summary {
    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Passed => self.passed,
            Outcome::Failed => self.failed,
            Outcome::Skipped => self.skipped,
            Outcome::Errored => self.errored,
        }
    }
}

/// Run-level artifact handed back to the caller.
#[derive(Debug, Clone)]
pub struct Report {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub results: Vec<RuleResult>,
    pub summary: Summary,
}

impl Report {
    pub fn status(&self) -> Outcome {
        self.summary.status
    }

    pub fn results_with(&self, outcome: Outcome) -> impl Iterator<Item = &RuleResult> {
        self.results.iter().filter(move |r| r.outcome == outcome)
    }
}

const NO_TABLE: &str = "<no table>";

/// FAILED beats ERRORED beats PASSED. Skipped rules never change the status.
fn escalate(outcomes: impl Iterator<Item = Outcome>) -> Outcome {
    outcomes.fold(Outcome::Passed, |status, outcome| match (status, outcome) {
        (Outcome::Failed, _) | (_, Outcome::Failed) => Outcome::Failed,
        (Outcome::Errored, _) | (_, Outcome::Errored) => Outcome::Errored,
        _ => Outcome::Passed,
    })
}

/// Collects results in input order and derives the run status.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Vec<RuleResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, result: RuleResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summary(&self) -> Summary {
        let mut counts: HashMap<Outcome, usize> = HashMap::new();
        let mut per_table: BTreeMap<String, Vec<Outcome>> = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.outcome).or_default() += 1;
            let table = if result.rule.table.is_empty() {
                NO_TABLE
            } else {
                &result.rule.table
            };
            per_table
                .entry(table.to_string())
                .or_default()
                .push(result.outcome);
        }
        let get = |o: Outcome| counts.get(&o).copied().unwrap_or(0);

        let status = escalate(self.results.iter().map(|r| r.outcome));
        let tables = per_table
            .into_iter()
            .map(|(table, outcomes)| (table, escalate(outcomes.into_iter())))
            .collect();

        Summary {
            total: self.results.len(),
            passed: get(Outcome::Passed),
            failed: get(Outcome::Failed),
            skipped: get(Outcome::Skipped),
            errored: get(Outcome::Errored),
            status,
            tables,
        }
    }

    pub fn finish(self, started_at: DateTime<Utc>, elapsed: Duration) -> Report {
        let summary = self.summary();
        Report {
            started_at,
            elapsed,
            results: self.results,
            summary,
        }
    }
}
