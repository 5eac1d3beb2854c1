//! Steepest-ascent hill climbing.

use crate::neighbor::{LexicalGenerator, NeighborGenerator};
use crate::objective::Objective;
use crate::search::{LocalSearch, SearchContext};
use rand::Rng;
use std::cmp::Ordering;

/// Evaluates the whole neighborhood and applies the best improving move.
///
/// The reference point advances to every new best seen during the scan, so
/// ties keep the first move found.
#[derive(Debug, Clone, Default)]
pub struct SteepestAscentHillClimber {
    generator: LexicalGenerator,
    num_steps: usize,
    num_neighbors: usize,
}

impl SteepestAscentHillClimber {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalSearch for SteepestAscentHillClimber {
    fn name(&self) -> &'static str {
        "steepest-hc"
    }

    fn initialize<O, R>(&mut self, _ctx: &mut SearchContext<'_, O, R>)
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        self.num_steps = 0;
        self.num_neighbors = 0;
    }

    fn next_step<O, R>(&mut self, ctx: &mut SearchContext<'_, O, R>) -> bool
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        ctx.refresh_group_masks();
        let (from, to) = ctx.masks();
        self.generator.initialize(ctx.partition(), from, to);
        ctx.objective_mut().set_now_as_ref_point();
        self.num_neighbors = 0;

        let mut best = None;
        while let Some(delta) = self.generator.next_move(ctx.rng()) {
            self.num_neighbors += 1;
            ctx.apply_delta(&delta);
            if ctx.objective().compare_to_last_ref_point() == Ordering::Greater {
                ctx.objective_mut().set_now_as_ref_point();
                best = Some(delta);
            }
            ctx.unapply_delta(&delta);
        }

        let Some(delta) = best else {
            return false;
        };
        ctx.apply_delta(&delta);
        self.num_steps += 1;
        true
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
    use crate::climb::SimpleHillClimber;
    use crate::partition::swap_pairs;
    use u_numflow::random::create_rng;

    #[test]
    fn test_every_step_improves() {
        for kind in kinds() {
            let (mut partition, weights) = instance(12, 4, 42);
            let mut objective = kind.build().unwrap();
            let mut ctx =
                SearchContext::new(&mut partition, &weights, objective.as_mut(), create_rng(1)).unwrap();
            let mut climber = SteepestAscentHillClimber::new();
            climber.initialize(&mut ctx);

            let mut last = ctx.value();
            while climber.next_step(&mut ctx) {
                assert!(ctx.value() <= last + 1e-4, "{kind}: value went up");
                last = ctx.value();
            }
            assert!(ctx.partition().is_valid());
            assert!((ctx.value() - ctx.objective().calculate(ctx.partition(), ctx.weights())).abs() < 1e-4);
        }
    }

    #[test]
    fn test_first_step_is_at_least_as_good_as_simple() {
        let kind = crate::objective::ObjectiveKind::Utilitarian;
        let (start, weights) = instance(12, 3, 9);

        let mut partition = start.clone();
        let mut objective = kind.build().unwrap();
        let mut ctx = SearchContext::new(&mut partition, &weights, objective.as_mut(), create_rng(1)).unwrap();
        let mut simple = SimpleHillClimber::new();
        simple.initialize(&mut ctx);
        let simple_moved = simple.next_step(&mut ctx);
        let simple_value = ctx.value();
        drop(ctx);

        let mut partition = start.clone();
        let mut objective = kind.build().unwrap();
        let mut ctx = SearchContext::new(&mut partition, &weights, objective.as_mut(), create_rng(1)).unwrap();
        let mut steepest = SteepestAscentHillClimber::new();
        steepest.initialize(&mut ctx);
        let steepest_moved = steepest.next_step(&mut ctx);

        assert_eq!(simple_moved, steepest_moved);
        assert!(ctx.value() <= simple_value + 1e-9);
        assert_eq!(steepest.num_neighbors(), swap_pairs(12, 3));
    }
}
