//! Simple (first-improvement) hill climbing.

use super::first_improvement;
use crate::neighbor::LexicalGenerator;
use crate::objective::Objective;
use crate::search::{LocalSearch, SearchContext};
use rand::Rng;

/// Takes the first strictly improving move in lexical order.
///
/// Stops when a full pass over the neighborhood finds nothing better, which
/// leaves the partition at a local optimum.
#[derive(Debug, Clone, Default)]
pub struct SimpleHillClimber {
    generator: LexicalGenerator,
    num_steps: usize,
    num_neighbors: usize,
}

impl SimpleHillClimber {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalSearch for SimpleHillClimber {
    fn name(&self) -> &'static str {
        "simple-hc"
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
