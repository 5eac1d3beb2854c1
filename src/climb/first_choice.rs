//! First-choice hill climbing.

use super::first_improvement;
use crate::neighbor::{max_gen_bound, RandomGenerator};
use crate::objective::Objective;
use crate::search::{LocalSearch, SearchContext};
use rand::Rng;

/// Samples random moves and takes the first improving one.
///
/// The per-step sample is capped at [`max_gen_bound`], so a failed step is
/// a probabilistic, not exhaustive, certificate of a local optimum.
#[derive(Debug, Clone, Default)]
pub struct FirstChoiceHillClimber {
    generator: RandomGenerator,
    num_steps: usize,
    num_neighbors: usize,
}

impl FirstChoiceHillClimber {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalSearch for FirstChoiceHillClimber {
    fn name(&self) -> &'static str {
        "first-choice-hc"
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
        let moved = first_improvement(&mut self.generator, ctx, &mut self.num_neighbors, |_, _, _| true);
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
    use u_numflow::random::create_rng;

    #[test]
    fn test_never_worsens() {
        for kind in kinds() {
            let (mut partition, weights) = instance(12, 3, 5);
            let mut objective = kind.build().unwrap();
            let mut ctx =
                SearchContext::new(&mut partition, &weights, objective.as_mut(), create_rng(42)).unwrap();
            let start = ctx.value();
            let mut climber = FirstChoiceHillClimber::new();
            climber.initialize(&mut ctx);
            while climber.next_step(&mut ctx) {}

            assert!(ctx.value() <= start + 1e-4, "{kind}: final value above start");
            assert!(ctx.partition().is_valid());
            assert!(climber.num_neighbors() <= max_gen_bound(ctx.partition()));
        }
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let run = |seed| {
            let (mut partition, weights) = instance(12, 4, 11);
            let mut objective = crate::objective::Utilitarian::new();
            let mut ctx =
                SearchContext::new(&mut partition, &weights, &mut objective, create_rng(seed)).unwrap();
            let mut climber = FirstChoiceHillClimber::new();
            climber.initialize(&mut ctx);
            while climber.next_step(&mut ctx) {}
            (ctx.value(), climber.num_steps())
        };
        assert_eq!(run(42), run(42));
    }
}
