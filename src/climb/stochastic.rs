//! Stochastic hill climbing.

use super::first_improvement;
use crate::error::{GroupingError, Result};
use crate::neighbor::{max_gen_bound, RandomGenerator};
use crate::objective::Objective;
use crate::search::{LocalSearch, SearchContext};
use rand::Rng;

/// Samples random moves and keeps an improving one with probability
/// `1 / (1 + exp(Δ / t))`, `Δ = next − current`.
///
/// Like [`super::FirstChoiceHillClimber`], the sample per step is capped at
/// [`max_gen_bound`].
#[derive(Debug, Clone)]
pub struct StochasticHillClimber {
    t: f64,
    generator: RandomGenerator,
    num_steps: usize,
    num_neighbors: usize,
}

impl StochasticHillClimber {
    /// Fixed temperature `t`.
    pub fn new(t: f64) -> Self {
        Self {
            t,
            generator: RandomGenerator::default(),
            num_steps: 0,
            num_neighbors: 0,
        }
    }

    /// Temperature calibrated so that a move of `max_delta` is picked with
    /// probability `p`: `t = max_delta / ln(−(p − 1) / p)`.
    pub fn from_acceptance(max_delta: f64, p: f64) -> Result<Self> {
        if !(p > 0.0 && p < 1.0) {
            return Err(GroupingError::InvalidConfig(format!(
                "acceptance probability must be in (0, 1), got {p}"
            )));
        }
        Ok(Self::new(max_delta / (-(p - 1.0) / p).ln()))
    }

    /// [`StochasticHillClimber::from_acceptance`] with `p = 0.9` and the
    /// objective's `max_delta_value(n, k)`.
    pub fn for_objective<O: Objective + ?Sized>(objective: &O, n: usize, k: usize) -> Self {
        Self::new(objective.max_delta_value(n, k) / (0.1f64 / 0.9).ln())
    }

    pub fn temperature(&self) -> f64 {
        self.t
    }

}

fn acceptance_probability(t: f64, current: f64, next: f64) -> f64 {
    1.0 / (1.0 + ((next - current) / t).exp())
}

impl LocalSearch for StochasticHillClimber {
    fn name(&self) -> &'static str {
        "stochastic-hc"
    }

    fn initialize<O, R>(&mut self, ctx: &mut SearchContext<'_, O, R>)
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        self.generator.set_cap(Some(max_gen_bound(ctx.partition())));
        self.num_steps = 0;
        self.num_neighbors = 0;
    }

    fn next_step<O, R>(&mut self, ctx: &mut SearchContext<'_, O, R>) -> bool
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        let t = self.t;
        let accept = |current: f64, next: f64, rng: &mut R| {
            rng.random::<f64>() <= acceptance_probability(t, current, next)
        };
        let moved = first_improvement(&mut self.generator, ctx, &mut self.num_neighbors, accept);
        if moved {
            self.num_steps += 1;
        }
        moved
    }

    fn num_steps(&self) -> usize {
        self.num_steps
    }

    fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climb::testing::{instance, kinds};
    use crate::objective::Utilitarian;
    use u_numflow::random::create_rng;

    #[test]
    fn test_temperature_from_acceptance() {
        let hc = StochasticHillClimber::from_acceptance(10.0, 0.9).unwrap();
        assert!((hc.temperature() - 10.0 / (1.0f64 / 9.0).ln()).abs() < 1e-12);
        assert!(StochasticHillClimber::from_acceptance(10.0, 1.0).is_err());

        let objective = Utilitarian::new();
        let hc = StochasticHillClimber::for_objective(&objective, 12, 3);
        assert!((hc.temperature() - 132.0 / (1.0f64 / 9.0).ln()).abs() < 1e-9);
    }

    #[test]
    fn test_probability_shape() {
        assert!((acceptance_probability(-5.0, 10.0, 10.0) - 0.5).abs() < 1e-12);
        // The calibrated temperature is negative, so larger drops are
        // accepted less often.
        assert!(acceptance_probability(-5.0, 10.0, 5.0) < 0.5);
        assert!(acceptance_probability(-5.0, 10.0, 5.0) > acceptance_probability(-5.0, 10.0, 0.0));
    }

    #[test]
    fn test_never_worsens() {
        for kind in kinds() {
            let (mut partition, weights) = instance(12, 3, 21);
            let mut objective = kind.build().unwrap();
            let (n, k) = (12, 3);
            let mut climber = StochasticHillClimber::for_objective(objective.as_ref(), n, k);
            let mut ctx =
                SearchContext::new(&mut partition, &weights, objective.as_mut(), create_rng(42)).unwrap();
            let start = ctx.value();
            climber.initialize(&mut ctx);
            let mut steps = 0;
            while climber.next_step(&mut ctx) && steps < 500 {
                steps += 1;
            }
            assert!(ctx.value() <= start + 1e-4, "{kind}: final value above start");
            assert!(ctx.partition().is_valid());
        }
    }
}
