// expecta-core/src/application/runner.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::domain::error::{ConfigError, RuntimeError};
use crate::domain::expectation::binder::bind;
use crate::domain::expectation::registry::ExpectationRegistry;
use crate::domain::project::ProjectConfig;
use crate::domain::report::{Report, ResultAggregator, RuleResult};
use crate::domain::rule::{LoadedRule, RuleRecord};
use crate::ports::accessor::DataAccessor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Rules evaluated at the same time.
    pub max_workers: usize,
    /// Whole-run budget; rules still pending when it expires end as cancelled.
    pub deadline: Option<Duration>,
    /// Budget of a single check evaluation.
    pub rule_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_workers: 8,
            deadline: None,
            rule_timeout: None,
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            deadline: config.deadline_secs.map(Duration::from_secs),
            rule_timeout: config.rule_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Evaluates loaded rules against one accessor. The registry is frozen on
/// construction and shared read-only by every evaluation.
pub struct ValidationRunner {
    registry: Arc<ExpectationRegistry>,
    options: RunOptions,
}

impl ValidationRunner {
    pub fn new(mut registry: ExpectationRegistry, options: RunOptions) -> Self {
        registry.freeze();
        Self {
            registry: Arc::new(registry),
            options,
        }
    }

    pub fn registry(&self) -> &ExpectationRegistry {
        &self.registry
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// One result per rule, in input order. Never fails as a whole:
    /// per-rule problems become ERRORED results.
    #[instrument(skip_all, fields(rules = rules.len(), engine = accessor.engine_name()))]
    pub async fn run(
        &self,
        rules: &[LoadedRule],
        accessor: &dyn DataAccessor,
        cancel: CancellationToken,
    ) -> Report {
        let started_at = Utc::now();
        let clock = Instant::now();

        let mut slots: Vec<Option<RuleResult>> = vec![None; rules.len()];
        let mut executable: Vec<(usize, &RuleRecord)> = Vec::new();

        for (slot, rule) in rules.iter().enumerate() {
            if !rule.enabled {
                trace!(rule = %rule.identity, "PENDING -> SKIPPED");
                slots[slot] = Some(RuleResult::skipped(Arc::clone(&rule.identity)));
                continue;
            }
            match &rule.record {
                Ok(record) => executable.push((slot, record)),
                Err(e) => {
                    debug!(rule = %rule.identity, error = %e, "PENDING -> ERROR_DONE");
                    slots[slot] = Some(RuleResult::errored(
                        Arc::clone(&rule.identity),
                        e.kind(),
                        e.to_string(),
                        Duration::ZERO,
                    ));
                }
            }
        }

        let workers = self.options.max_workers.max(1);
        let mut evaluations = futures::stream::iter(executable.into_iter().map(|(slot, record)| async move {
            (slot, self.evaluate(record, accessor).await)
        }))
        .buffer_unordered(workers);

        let deadline = async {
            match self.options.deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let interrupted = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break Some("run cancelled"),
                _ = &mut deadline => break Some("run deadline exceeded"),
                next = evaluations.next() => match next {
                    Some((slot, result)) => slots[slot] = Some(result),
                    None => break None,
                },
            }
        };
        // In-flight evaluations are dropped here.
        drop(evaluations);

        if let Some(reason) = interrupted {
            warn!(reason, "Validation interrupted, pending rules reported as cancelled");
        }

        let mut aggregator = ResultAggregator::with_capacity(rules.len());
        for (slot, result) in slots.into_iter().enumerate() {
            let result = result.unwrap_or_else(|| {
                let err = RuntimeError::Cancelled(interrupted.unwrap_or("run interrupted").to_string());
                RuleResult::errored(
                    Arc::clone(&rules[slot].identity),
                    err.kind(),
                    err.to_string(),
                    Duration::ZERO,
                )
            });
            aggregator.add(result);
        }

        let report = aggregator.finish(started_at, clock.elapsed());
        info!(
            status = %report.status(),
            passed = report.summary.passed,
            failed = report.summary.failed,
            errored = report.summary.errored,
            skipped = report.summary.skipped,
            "Validation finished"
        );
        report
    }

    /// RESOLVING -> BINDING -> EXECUTING for one rule.
    async fn evaluate(&self, record: &RuleRecord, accessor: &dyn DataAccessor) -> RuleResult {
        let identity = Arc::clone(record.identity());
        let started = Instant::now();

        trace!(rule = %identity, "RESOLVING");
        let descriptor = match self.registry.resolve(record.expectation_type()) {
            Ok(descriptor) => descriptor,
            Err(_) => {
                let err = ConfigError::UnknownExpectation {
                    rule: identity.to_string(),
                    name: record.expectation_type().to_string(),
                };
                debug!(rule = %identity, "RESOLVING -> ERROR_DONE");
                return RuleResult::errored(identity, err.kind(), err.to_string(), started.elapsed());
            }
        };

        trace!(rule = %identity, "BINDING");
        let params = match bind(&descriptor, record) {
            Ok(params) => params,
            Err(e) => {
                debug!(rule = %identity, error = %e, "BINDING -> ERROR_DONE");
                return RuleResult::errored(identity, e.kind(), e.to_string(), started.elapsed());
            }
        };

        let warnings: Vec<String> = params
            .ignored()
            .iter()
            .map(|key| format!("ignored unknown parameter '{key}'"))
            .collect();
        for warning in &warnings {
            warn!(rule = %identity, "{warning}");
        }

        trace!(rule = %identity, "EXECUTING");
        let evaluation = descriptor.check().evaluate(accessor, &params);
        let outcome = match self.options.rule_timeout {
            Some(limit) => match tokio::time::timeout(limit, evaluation).await {
                Ok(outcome) => outcome,
                Err(_) => Err(RuntimeError::Timeout(limit).into()),
            },
            None => evaluation.await,
        };

        let elapsed = started.elapsed();
        match outcome {
            Ok(verdict) => {
                debug!(rule = %identity, passed = verdict.passed, "EXECUTING -> DONE");
                RuleResult::from_verdict(identity, verdict, warnings, elapsed)
            }
            Err(e) => {
                debug!(rule = %identity, error = %e, "EXECUTING -> ERROR_DONE");
                RuleResult::errored(identity, e.kind(), e.to_string(), elapsed)
            }
        }
    }
}
