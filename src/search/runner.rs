//! Budgeted execution loop with per-step telemetry.

use super::{LocalSearch, SearchContext};
use crate::error::{GroupingError, Result};
use crate::objective::Objective;
use rand::Rng;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outer limits on a run, on top of the search's own stopping rule.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchBudget {
    /// Maximum number of `next_step` calls. `None` = unlimited.
    pub max_steps: Option<usize>,

    /// Wall-clock limit. `None` = unlimited.
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Validates the budget.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == Some(0) {
            return Err(GroupingError::InvalidConfig(
                "max_steps must be positive".into(),
            ));
        }
        if self.time_limit.is_some_and(|t| t.is_zero()) {
            return Err(GroupingError::InvalidConfig(
                "time_limit must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The search reported no further step.
    Exhausted,
    /// `SearchBudget::max_steps` was reached.
    StepLimit,
    /// `SearchBudget::time_limit` elapsed.
    TimeLimit,
    /// The cancellation flag was raised.
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Termination::Exhausted => "exhausted",
            Termination::StepLimit => "step limit",
            Termination::TimeLimit => "time limit",
            Termination::Cancelled => "cancelled",
        })
    }
}

/// Diagnostics of one successful step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepRecord {
    /// Moves evaluated during the step.
    pub neighbors: usize,
    /// Objective change, `after − before`.
    pub delta: f64,
}

/// Outcome of a [`SearchRunner`] run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// Objective value of the final partition.
    pub value: f64,
    /// Steps reported by the search itself.
    pub num_steps: usize,
    /// Moves evaluated across all steps, including the final failed one.
    pub total_neighbors: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// One record per successful step.
    pub steps: Vec<StepRecord>,
    pub termination: Termination,
}

impl SearchResult {
    /// Mean objective change per recorded step, `0` when none.
    pub fn mean_delta(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.steps.iter().map(|s| s.delta).sum::<f64>() / self.steps.len() as f64
    }

    /// Mean number of evaluated moves per recorded step, `0` when none.
    pub fn mean_neighbors_per_step(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.steps.iter().map(|s| s.neighbors as f64).sum::<f64>() / self.steps.len() as f64
    }
}

/// Drives any [`LocalSearch`] to completion.
pub struct SearchRunner;

impl SearchRunner {
    /// Initializes `search` on `ctx` and steps it until it stops or the
    /// budget runs out.
    pub fn run<S, O, R>(
        search: &mut S,
        ctx: &mut SearchContext<'_, O, R>,
        budget: &SearchBudget,
    ) -> SearchResult
    where
        S: LocalSearch,
        O: Objective + ?Sized,
        R: Rng,
    {
        Self::run_with_cancel(search, ctx, budget, None)
    }

    /// Like [`SearchRunner::run`], also polling `cancel` before every step.
    #[tracing::instrument(level = "debug", skip_all, fields(search = search.name()))]
    pub fn run_with_cancel<S, O, R>(
        search: &mut S,
        ctx: &mut SearchContext<'_, O, R>,
        budget: &SearchBudget,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SearchResult
    where
        S: LocalSearch,
        O: Objective + ?Sized,
        R: Rng,
    {
        let start = Instant::now();
        search.initialize(ctx);
        let initial = ctx.value();
        tracing::debug!(
            "{}: start at {} ({})",
            search.name(),
            initial,
            ctx.objective().name()
        );

        let mut steps = Vec::new();
        let mut total_neighbors = 0;
        let mut calls = 0usize;

        let termination = loop {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                break Termination::Cancelled;
            }
            if budget.max_steps.is_some_and(|max| calls >= max) {
                break Termination::StepLimit;
            }
            if budget.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                break Termination::TimeLimit;
            }

            let before = ctx.value();
            let advanced = search.next_step(ctx);
            calls += 1;
            total_neighbors += search.num_neighbors();
            if !advanced {
                break Termination::Exhausted;
            }
            let record = StepRecord {
                neighbors: search.num_neighbors(),
                delta: ctx.value() - before,
            };
            tracing::trace!("{}: step {} delta {}", search.name(), calls, record.delta);
            steps.push(record);
        };

        let value = ctx.value();
        let elapsed = start.elapsed();
        tracing::debug!(
            "{}: {} -> {} after {} steps ({})",
            search.name(),
            initial,
            value,
            search.num_steps(),
            termination
        );

        SearchResult {
            value,
            num_steps: search.num_steps(),
            total_neighbors,
            elapsed,
            steps,
            termination,
        }
    }
}
