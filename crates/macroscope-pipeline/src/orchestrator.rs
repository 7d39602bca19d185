use std::sync::Arc;
use std::time::{Duration, Instant};

use macroscope_models::{EvaluationContext, FetchConfig, IndicatorId, IndicatorResult};
use macroscope_sources::Fetcher;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::indicators::{Indicator, Observation};

/// Lifecycle of one indicator within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    Fetching,
    Parsing,
    Evaluated,
    Failed,
}

/// Concurrency and time bounds for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub max_concurrency: usize,
    pub indicator_timeout: Duration,
    pub run_deadline: Duration,
}

impl RunLimits {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            indicator_timeout: Duration::from_secs(config.indicator_timeout_seconds),
            run_deadline: Duration::from_secs(config.run_deadline_seconds),
        }
    }
}

impl Default for RunLimits {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Fetches and parses every indicator concurrently, then evaluates them one
/// by one in declaration order so later rules can read earlier alerts.
pub struct Orchestrator {
    indicators: Vec<Arc<dyn Indicator>>,
    fetcher: Arc<dyn Fetcher>,
    limits: RunLimits,
}

impl Orchestrator {
    /// Fails when an indicator is declared before one it depends on.
    pub fn new(
        indicators: Vec<Arc<dyn Indicator>>,
        fetcher: Arc<dyn Fetcher>,
        limits: RunLimits,
    ) -> Result<Self, PipelineError> {
        let ids: Vec<IndicatorId> = indicators.iter().map(|i| i.id()).collect();
        validate_order(&ids)?;
        Ok(Self {
            indicators,
            fetcher,
            limits,
        })
    }

    pub fn indicator_ids(&self) -> Vec<IndicatorId> {
        self.indicators.iter().map(|i| i.id()).collect()
    }

    /// Run every indicator once. Always yields one result per indicator, in
    /// declaration order; failures become error results.
    pub async fn run(&self, run_id: Uuid, cancel: &CancellationToken) -> Vec<IndicatorResult> {
        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + self.limits.run_deadline;
        info!(%run_id, indicators = self.indicators.len(), "Starting indicator run");

        // 1. Fan out fetch and parse, bounded by the worker pool
        let permits = Arc::new(Semaphore::new(self.limits.max_concurrency.max(1)));
        let mut handles: Vec<(IndicatorId, JoinHandle<Result<Observation, PipelineError>>)> =
            Vec::new();
        for indicator in &self.indicators {
            let indicator = Arc::clone(indicator);
            let fetcher = Arc::clone(&self.fetcher);
            let permits = Arc::clone(&permits);
            let timeout = self.limits.indicator_timeout;
            let id = indicator.id();
            debug!(%run_id, indicator = %id, stage = ?Stage::Pending, "Stage transition");

            handles.push((
                id,
                tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|e| PipelineError::Task(e.to_string()))?;
                    tokio::time::timeout(timeout, observe(run_id, indicator.as_ref(), fetcher.as_ref()))
                        .await
                        .map_err(|_| PipelineError::Timeout(timeout))?
                }),
            ));
        }

        // 2. Evaluate in order, threading earlier results through the context
        let mut context = EvaluationContext::new();
        let mut results = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let outcome = self.collect(handle, deadline, cancel).await;
            let result = match outcome {
                Ok(observation) => {
                    let result = observation.evaluate(&context);
                    debug!(%run_id, indicator = %id, stage = ?Stage::Evaluated, alert = result.alert, "Stage transition");
                    result
                }
                Err(e) => {
                    warn!(%run_id, indicator = %id, stage = ?Stage::Failed, error = %e, "Indicator failed");
                    IndicatorResult::failed(id, e.to_string())
                }
            };
            context.record(&result);
            results.push(result);
        }

        info!(
            %run_id,
            alerts = results.iter().filter(|r| r.alert).count(),
            errors = results.iter().filter(|r| r.error).count(),
            elapsed_ms = start.elapsed().as_millis(),
            "Indicator run complete"
        );
        results
    }

    async fn collect(
        &self,
        mut handle: JoinHandle<Result<Observation, PipelineError>>,
        deadline: tokio::time::Instant,
        cancel: &CancellationToken,
    ) -> Result<Observation, PipelineError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                handle.abort();
                Err(PipelineError::Cancelled)
            }
            joined = tokio::time::timeout_at(deadline, &mut handle) => match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    error!(error = %e, "Indicator task panicked");
                    Err(PipelineError::Task(e.to_string()))
                }
                Err(_) => {
                    handle.abort();
                    Err(PipelineError::DeadlineExceeded(self.limits.run_deadline))
                }
            },
        }
    }
}

async fn observe(
    run_id: Uuid,
    indicator: &dyn Indicator,
    fetcher: &dyn Fetcher,
) -> Result<Observation, PipelineError> {
    let id = indicator.id();
    let started = Instant::now();

    debug!(%run_id, indicator = %id, stage = ?Stage::Fetching, "Stage transition");
    let content = indicator.fetch(fetcher).await?;

    debug!(%run_id, indicator = %id, stage = ?Stage::Parsing, bytes = content.len(), "Stage transition");
    let observation = indicator.parse(content).await?;

    info!(%run_id, indicator = %id, elapsed_ms = started.elapsed().as_millis(), "Indicator observed");
    Ok(observation)
}

/// Every dependency that is present must come before its dependent. An
/// absent dependency is allowed and reads as "no alert".
pub fn validate_order(ids: &[IndicatorId]) -> Result<(), PipelineError> {
    for (position, id) in ids.iter().enumerate() {
        let Some(dependency) = id.depends_on() else {
            continue;
        };
        if let Some(found) = ids.iter().position(|other| *other == dependency) {
            if found > position {
                return Err(PipelineError::Ordering {
                    dependent: *id,
                    dependency,
                });
            }
        }
    }
    Ok(())
}
