//! Stop criteria for iterative searches.
//!
//! A criterion observes every evaluated move through
//! [`StopCriterion::next_step`] and, for annealing, every temperature change
//! through [`StopCriterion::on_temperature_change`]. The search polls
//! [`StopCriterion::should_stop`] before each step.

use crate::numeric::{self, EPSILON};
use std::fmt;

/// Decides when a search should give up.
pub trait StopCriterion: fmt::Debug {
    /// Clears all progress so the criterion can guard a fresh run.
    fn reset(&mut self);

    fn should_stop(&self) -> bool;

    /// Records a move from `current` to `next`, and whether it was taken.
    fn next_step(&mut self, current: f64, next: f64, accepted: bool);

    /// Called by annealing whenever the temperature drops.
    fn on_temperature_change(&mut self) {}
}

/// Stops after a fixed number of observed moves.
#[derive(Debug, Clone)]
pub struct MaxSteps {
    max_steps: usize,
    steps: usize,
}

impl MaxSteps {
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps,
            steps: 0,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl StopCriterion for MaxSteps {
    fn reset(&mut self) {
        self.steps = 0;
    }

    fn should_stop(&self) -> bool {
        self.steps >= self.max_steps
    }

    fn next_step(&mut self, _current: f64, _next: f64, _accepted: bool) {
        self.steps += 1;
    }
}

/// Stops after `max_low_steps` consecutive moves whose improvement
/// `current − next` is at most `threshold`.
#[derive(Debug, Clone)]
pub struct LowImprovement {
    threshold: f64,
    max_low_steps: usize,
    low_steps: usize,
}

impl LowImprovement {
    pub fn new(threshold: f64, max_low_steps: usize) -> Self {
        Self {
            threshold,
            max_low_steps,
            low_steps: 0,
        }
    }

    /// Current run of low-improvement moves.
    pub fn low_steps(&self) -> usize {
        self.low_steps
    }
}

impl StopCriterion for LowImprovement {
    fn reset(&mut self) {
        self.low_steps = 0;
    }

    fn should_stop(&self) -> bool {
        self.low_steps >= self.max_low_steps
    }

    fn next_step(&mut self, current: f64, next: f64, _accepted: bool) {
        if current - next <= self.threshold {
            self.low_steps += 1;
        } else {
            self.low_steps = 0;
        }
    }
}

/// Stops once the share of accepted value-changing moves stays below
/// `min_percent` for `max_low_rate_temperatures` temperature levels with no
/// new best value found in between.
#[derive(Debug, Clone)]
pub struct MinAcceptanceRate {
    min_rate: f64,
    max_low_rate_temperatures: usize,
    low_rate_temperatures: usize,
    reps: usize,
    accepted: usize,
    best_value: f64,
}

impl Default for MinAcceptanceRate {
    fn default() -> Self {
        Self::new(2.0, 5)
    }
}

impl MinAcceptanceRate {
    pub fn new(min_percent: f64, max_low_rate_temperatures: usize) -> Self {
        Self {
            min_rate: min_percent * 0.01,
            max_low_rate_temperatures,
            low_rate_temperatures: 0,
            reps: 0,
            accepted: 0,
            best_value: f64::INFINITY,
        }
    }

    /// Consecutive low-rate temperatures since the last new best.
    pub fn low_rate_temperatures(&self) -> usize {
        self.low_rate_temperatures
    }
}

impl StopCriterion for MinAcceptanceRate {
    fn reset(&mut self) {
        self.best_value = f64::INFINITY;
        self.low_rate_temperatures = 0;
        self.reps = 0;
        self.accepted = 0;
    }

    fn should_stop(&self) -> bool {
        self.low_rate_temperatures >= self.max_low_rate_temperatures
    }

    fn next_step(&mut self, current: f64, next: f64, accepted: bool) {
        self.reps += 1;
        if accepted && !numeric::is_close(current, next, EPSILON) {
            if next + EPSILON < self.best_value {
                self.low_rate_temperatures = 0;
                self.best_value = next;
            }
            self.accepted += 1;
        }
    }

    fn on_temperature_change(&mut self) {
        if self.reps > 0 && (self.accepted as f64) / (self.reps as f64) < self.min_rate {
            self.low_rate_temperatures += 1;
        }
        self.accepted = 0;
        self.reps = 0;
    }
}

/// Serializable choice of [`StopCriterion`], for configs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopRule {
    MaxSteps(usize),
    LowImprovement { threshold: f64, max_low_steps: usize },
    MinAcceptanceRate { min_percent: f64, max_low_rate_temperatures: usize },
}

impl Default for StopRule {
    fn default() -> Self {
        StopRule::MinAcceptanceRate {
            min_percent: 2.0,
            max_low_rate_temperatures: 5,
        }
    }
}

impl StopRule {
    pub fn build(&self) -> Box<dyn StopCriterion> {
        match *self {
            StopRule::MaxSteps(max) => Box::new(MaxSteps::new(max)),
            StopRule::LowImprovement {
                threshold,
                max_low_steps,
            } => Box::new(LowImprovement::new(threshold, max_low_steps)),
            StopRule::MinAcceptanceRate {
                min_percent,
                max_low_rate_temperatures,
            } => Box::new(MinAcceptanceRate::new(min_percent, max_low_rate_temperatures)),
        }
    }
}
