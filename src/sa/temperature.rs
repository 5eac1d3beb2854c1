//! Data-driven initial temperature (Ben-Ameur 2004).
//!
//! Samples uphill transitions `(from, to)` from random partitions and
//! searches for the temperature `t` whose mean acceptance probability
//! `mean(exp((from − to) / t))` matches a target `x₀`. Chunks of fresh
//! samples are added until two successive estimates agree.
//!
//! # References
//!
//! - Ben-Ameur (2004), "Computing the Initial Temperature of Simulated
//!   Annealing", Computational Optimization and Applications 29, 369–385

use crate::error::{GroupingError, Result};
use crate::neighbor::{NeighborGenerator, RandomGenerator};
use crate::numeric::EPSILON;
use crate::objective::Objective;
use crate::partition::{GroupMask, Partition, WeightMatrix};
use rand::Rng;
use tracing::{debug, warn};

/// Parameters of [`estimate_initial_temperature`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BenAmeurConfig {
    /// Target acceptance probability `x₀` of an uphill move, in (0, 1).
    pub target_acceptance: f64,

    /// Uphill transitions each chunk must contribute.
    pub chunk_size: usize,

    /// Uphill transitions required before the first chunk.
    pub initial_transitions: usize,

    /// Random states tried for the initial sample.
    pub initial_states: usize,

    /// Random states tried per chunk.
    pub states_per_chunk: usize,

    /// Successive chunk estimates closer than this have converged.
    pub temperature_epsilon: f64,

    /// Refinement stops once `|x̂ − x₀|` is within this.
    pub acceptance_epsilon: f64,

    /// Cap on refinement iterations per chunk.
    pub max_refinements: usize,

    /// Cap on chunks. `None` = the number of persons.
    pub max_chunks: Option<usize>,
}

impl Default for BenAmeurConfig {
    fn default() -> Self {
        Self {
            target_acceptance: 0.4,
            chunk_size: 5,
            initial_transitions: 10,
            initial_states: 1000,
            states_per_chunk: 500,
            temperature_epsilon: 0.1,
            acceptance_epsilon: 1e-2,
            max_refinements: 100,
            max_chunks: None,
        }
    }
}

impl BenAmeurConfig {
    pub fn with_target_acceptance(mut self, x0: f64) -> Self {
        self.target_acceptance = x0;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_states_per_chunk(mut self, states: usize) -> Self {
        self.states_per_chunk = states;
        self
    }

    pub fn with_max_chunks(mut self, chunks: usize) -> Self {
        self.max_chunks = Some(chunks);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.target_acceptance > 0.0 && self.target_acceptance < 1.0) {
            return Err(GroupingError::InvalidConfig(format!(
                "target_acceptance must be in (0, 1), got {}",
                self.target_acceptance
            )));
        }
        if self.chunk_size == 0 || self.initial_transitions == 0 {
            return Err(GroupingError::InvalidConfig(
                "chunk_size and initial_transitions must be positive".into(),
            ));
        }
        if self.temperature_epsilon <= 0.0 || self.acceptance_epsilon <= 0.0 {
            return Err(GroupingError::InvalidConfig(
                "epsilons must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of [`estimate_initial_temperature`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemperatureEstimate {
    pub temperature: f64,

    /// `false` when the objective's `max_delta_value` was used instead.
    pub converged: bool,

    /// Chunks sampled after the initial sample.
    pub chunks: usize,

    /// Uphill transitions collected in total.
    pub transitions: usize,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: f64,
    to: f64,
}

/// Estimates an initial annealing temperature for `objective` on
/// partitions shaped like `partition`.
///
/// Falls back to `objective.max_delta_value(n, k)` when too few uphill
/// transitions are found or the estimates do not settle. The caller's
/// partition is untouched and the objective is re-initialized on it before
/// returning.
#[tracing::instrument(level = "debug", skip_all)]
pub fn estimate_initial_temperature<O, R>(
    objective: &mut O,
    partition: &Partition,
    weights: &WeightMatrix,
    config: &BenAmeurConfig,
    rng: &mut R,
) -> Result<TemperatureEstimate>
where
    O: Objective + ?Sized,
    R: Rng,
{
    config.validate()?;
    let (n, k) = (partition.num_people(), partition.num_groups());
    if weights.len() != n {
        return Err(GroupingError::SizeMismatch {
            weights: weights.len(),
            partition: n,
        });
    }

    let estimate = estimate(objective, partition, weights, config, rng);
    objective.initialize(partition, weights);

    Ok(match estimate {
        Ok(estimate) => {
            debug!(
                temperature = estimate.temperature,
                chunks = estimate.chunks,
                transitions = estimate.transitions,
                "initial temperature estimated"
            );
            estimate
        }
        Err(Fallback { reason, chunks, transitions }) => {
            let temperature = objective.max_delta_value(n, k);
            warn!(reason, chunks, transitions, temperature, "initial temperature falls back to max delta");
            TemperatureEstimate {
                temperature,
                converged: false,
                chunks,
                transitions,
            }
        }
    })
}

struct Fallback {
    reason: &'static str,
    chunks: usize,
    transitions: usize,
}

fn estimate<O, R>(
    objective: &mut O,
    partition: &Partition,
    weights: &WeightMatrix,
    config: &BenAmeurConfig,
    rng: &mut R,
) -> std::result::Result<TemperatureEstimate, Fallback>
where
    O: Objective + ?Sized,
    R: Rng,
{
    let mut scratch = partition.clone();
    let mut sampler = Sampler::new(&scratch);
    let mut transitions = Vec::new();
    let log_x0 = config.target_acceptance.ln();
    let max_chunks = config.max_chunks.unwrap_or(partition.num_people());

    sampler.sample(
        objective,
        &mut scratch,
        weights,
        config.initial_transitions,
        config.initial_states,
        rng,
        &mut transitions,
    );
    if transitions.len() < config.initial_transitions {
        return Err(Fallback {
            reason: "too few initial uphill transitions",
            chunks: 0,
            transitions: transitions.len(),
        });
    }

    let mut chunks = 0;
    let mut last: Option<f64> = None;
    loop {
        if chunks >= max_chunks {
            return Err(Fallback {
                reason: "chunk limit reached",
                chunks,
                transitions: transitions.len(),
            });
        }
        let before = transitions.len();
        sampler.sample(
            objective,
            &mut scratch,
            weights,
            config.chunk_size,
            config.states_per_chunk,
            rng,
            &mut transitions,
        );
        if transitions.len() - before < config.chunk_size {
            return Err(Fallback {
                reason: "too few uphill transitions in chunk",
                chunks,
                transitions: transitions.len(),
            });
        }
        chunks += 1;

        let t = refine(&transitions, log_x0, config).ok_or(Fallback {
            reason: "refinement did not converge",
            chunks,
            transitions: transitions.len(),
        })?;
        if last.is_some_and(|last| (t - last).abs() < config.temperature_epsilon) {
            return Ok(TemperatureEstimate {
                temperature: t,
                converged: true,
                chunks,
                transitions: transitions.len(),
            });
        }
        last = Some(t);
    }
}

/// Closed-form start `−Σδ / (count · ln x₀)`, then `t *= sqrt(ln x̂ / ln x₀)`
/// until the estimated acceptance is within epsilon of `x₀`.
fn refine(transitions: &[Transition], log_x0: f64, config: &BenAmeurConfig) -> Option<f64> {
    let count = transitions.len() as f64;
    let sum: f64 = transitions.iter().map(|tr| tr.to - tr.from).sum();
    let mut t = -sum / (count * log_x0);

    for _ in 0..config.max_refinements {
        if !(t.is_finite() && t > 0.0) {
            return None;
        }
        let x_hat = transitions.iter().map(|tr| ((tr.from - tr.to) / t).exp()).sum::<f64>() / count;
        if (x_hat - config.target_acceptance).abs() <= config.acceptance_epsilon {
            return Some(t);
        }
        t *= (x_hat.ln() / log_x0).sqrt();
    }
    None
}

/// Draws one random move per random state and keeps the uphill ones.
struct Sampler {
    generator: RandomGenerator,
    full: GroupMask,
}

impl Sampler {
    fn new(partition: &Partition) -> Self {
        Self {
            generator: RandomGenerator::with_cap(1),
            full: GroupMask::full(partition.num_groups()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn sample<O, R>(
        &mut self,
        objective: &mut O,
        scratch: &mut Partition,
        weights: &WeightMatrix,
        target: usize,
        states: usize,
        rng: &mut R,
        out: &mut Vec<Transition>,
    ) where
        O: Objective + ?Sized,
        R: Rng,
    {
        let mut found = 0;
        for _ in 0..states {
            if found >= target {
                break;
            }
            scratch.randomize(rng);
            objective.initialize(scratch, weights);
            self.generator.initialize(scratch, &self.full, &self.full);
            let from = objective.value();
            while let Some(delta) = self.generator.next_move(rng) {
                objective.apply_delta(scratch, weights, &delta);
                scratch.swap(&delta);
                let to = objective.value();
                if from + EPSILON < to {
                    out.push(Transition { from, to });
                    found += 1;
                }
                objective.apply_delta(scratch, weights, &delta);
                scratch.swap(&delta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climb::testing::{instance, kinds};
    use crate::objective::Utilitarian;
    use u_numflow::random::create_rng;

    #[test]
    fn test_refine_hits_target() {
        let transitions: Vec<_> = [(10.0, 12.0), (10.0, 15.0), (20.0, 21.0), (5.0, 9.0), (7.0, 8.0)]
            .into_iter()
            .map(|(from, to)| Transition { from, to })
            .collect();
        let config = BenAmeurConfig::default();
        let t = refine(&transitions, config.target_acceptance.ln(), &config).unwrap();
        let x_hat = transitions.iter().map(|tr| ((tr.from - tr.to) / t).exp()).sum::<f64>()
            / transitions.len() as f64;
        assert!((x_hat - 0.4).abs() <= 1e-2, "x_hat = {x_hat}");
    }

    #[test]
    fn test_estimate_is_positive_and_restores_objective() {
        for kind in kinds() {
            let (partition, weights) = instance(12, 3, 42);
            let mut objective = kind.build().unwrap();
            objective.initialize(&partition, &weights);
            let before = objective.value();

            let config = BenAmeurConfig::default();
            let estimate =
                estimate_initial_temperature(objective.as_mut(), &partition, &weights, &config, &mut create_rng(42))
                    .unwrap();
            assert!(estimate.temperature > 0.0, "{kind}: {estimate:?}");
            assert!(estimate.temperature.is_finite());
            assert!(
                (objective.value() - before).abs() < 1e-9,
                "{kind}: objective not re-initialized on the caller's partition"
            );
            if estimate.converged {
                assert!(estimate.chunks >= 2, "convergence needs two estimates");
            }
        }
    }

    #[test]
    fn test_chunk_limit_falls_back() {
        let (partition, weights) = instance(12, 3, 7);
        let mut objective = Utilitarian::new();
        let config = BenAmeurConfig::default().with_max_chunks(1);
        let estimate =
            estimate_initial_temperature(&mut objective, &partition, &weights, &config, &mut create_rng(1)).unwrap();
        assert!(!estimate.converged);
        assert_eq!(estimate.temperature, objective.max_delta_value(12, 3));
    }

    #[test]
    fn test_invalid_inputs() {
        let (partition, weights) = instance(12, 3, 7);
        let mut objective = Utilitarian::new();
        let config = BenAmeurConfig::default().with_target_acceptance(1.5);
        assert!(estimate_initial_temperature(&mut objective, &partition, &weights, &config, &mut create_rng(1)).is_err());

        let small = WeightMatrix::random(6, &mut create_rng(1));
        let err = estimate_initial_temperature(
            &mut objective,
            &partition,
            &small,
            &BenAmeurConfig::default(),
            &mut create_rng(1),
        )
        .unwrap_err();
        assert_eq!(err, GroupingError::SizeMismatch { weights: 6, partition: 12 });
    }
}
