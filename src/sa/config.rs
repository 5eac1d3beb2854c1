//! SA configuration: cooling and repetition schedules.

use crate::error::{GroupingError, Result};
use crate::objective::Objective;
use crate::stop::StopRule;

/// Temperature as a function of the cooling step `k`.
///
/// # References
///
/// - Logarithmic: Geman & Geman (1984), the schedule with a convergence proof
/// - Geometric: Kirkpatrick et al. (1983)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoolingSchedule {
    /// `a · t₀ / ln(1 + k)`. Infinite at `k = 0`.
    Logarithmic { a: f64 },

    /// `t₀ − a · k`. Reaches zero after `t₀ / a` steps.
    Linear { a: f64 },

    /// `t₀ · aᵏ`, with `a` in (0, 1).
    Geometric { a: f64 },

    /// `t₀ · exp(−a · k)`.
    Exponential { a: f64 },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { a: 0.95 }
    }
}

impl CoolingSchedule {
    /// Temperature at cooling step `k`.
    pub fn temperature(&self, t0: f64, k: usize) -> f64 {
        let k = k as f64;
        match *self {
            CoolingSchedule::Logarithmic { a } => a * t0 / (1.0 + k).ln(),
            CoolingSchedule::Linear { a } => t0 - a * k,
            CoolingSchedule::Geometric { a } => t0 * a.powf(k),
            CoolingSchedule::Exponential { a } => t0 * (-a * k).exp(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            CoolingSchedule::Geometric { a } if !(a > 0.0 && a < 1.0) => Err(
                GroupingError::InvalidConfig(format!("geometric factor must be in (0, 1), got {a}")),
            ),
            CoolingSchedule::Logarithmic { a }
            | CoolingSchedule::Linear { a }
            | CoolingSchedule::Exponential { a }
                if !(a > 0.0 && a.is_finite()) =>
            {
                Err(GroupingError::InvalidConfig(format!(
                    "cooling factor must be positive, got {a}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Ceiling on the repetitions spent at one temperature.
pub const MAX_REPETITIONS: usize = 1 << 20;

/// Number of repetitions spent at temperature `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RepetitionSchedule {
    Constant(usize),

    /// `⌈exp(d / t)⌉`: more repetitions as the system cools.
    Exponential { d: f64 },
}

impl Default for RepetitionSchedule {
    fn default() -> Self {
        RepetitionSchedule::Constant(100)
    }
}

impl RepetitionSchedule {
    /// Repetition budget at temperature `t`, saturating at [`MAX_REPETITIONS`].
    pub fn repetitions(&self, t: f64) -> usize {
        match *self {
            RepetitionSchedule::Constant(n) => n,
            RepetitionSchedule::Exponential { d } => {
                let reps = (d / t).exp().ceil();
                if reps.is_finite() && reps < MAX_REPETITIONS as f64 {
                    reps.max(1.0) as usize
                } else {
                    MAX_REPETITIONS
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            RepetitionSchedule::Constant(0) => Err(GroupingError::InvalidConfig(
                "constant repetitions must be at least 1".into(),
            )),
            RepetitionSchedule::Exponential { d } if !(d > 0.0 && d.is_finite()) => Err(
                GroupingError::InvalidConfig(format!("repetition factor must be positive, got {d}")),
            ),
            _ => Ok(()),
        }
    }
}

/// Configuration for [`super::SimulatedAnnealing`].
///
/// # Examples
///
/// ```
/// use u_grouping::sa::{CoolingSchedule, RepetitionSchedule, SaConfig};
///
/// let config = SaConfig::default()
///     .with_initial_temperature(250.0)
///     .with_cooling(CoolingSchedule::Exponential { a: 0.05 })
///     .with_repetitions(RepetitionSchedule::Constant(400));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaConfig {
    /// Starting temperature `t₀`. See
    /// [`super::estimate_initial_temperature`] for a data-driven choice.
    pub initial_temperature: f64,

    pub cooling: CoolingSchedule,

    pub repetitions: RepetitionSchedule,

    /// When to give up.
    pub stop: StopRule,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling: CoolingSchedule::default(),
            repetitions: RepetitionSchedule::default(),
            stop: StopRule::default(),
        }
    }
}

impl SaConfig {
    /// Geometric cooling at `0.95` with `16 ×` the objective's expected
    /// neighborhood size as constant repetitions, stopping on a low
    /// acceptance rate.
    pub fn calibrated<O: Objective + ?Sized>(objective: &O, n: usize, k: usize, t0: f64) -> Self {
        let reps = 16 * objective.expected_neighborhood_size(n, k).max(1);
        Self {
            initial_temperature: t0,
            cooling: CoolingSchedule::Geometric { a: 0.95 },
            repetitions: RepetitionSchedule::Constant(reps),
            stop: StopRule::default(),
        }
    }

    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_repetitions(mut self, repetitions: RepetitionSchedule) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_stop(mut self, stop: StopRule) -> Self {
        self.stop = stop;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return Err(GroupingError::InvalidConfig(format!(
                "initial_temperature must be positive, got {}",
                self.initial_temperature
            )));
        }
        self.cooling.validate()?;
        self.repetitions.validate()
    }
}
