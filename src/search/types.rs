//! The step-wise local search abstraction.

use super::SearchContext;
use crate::objective::Objective;
use rand::Rng;

/// A local search driven one step at a time.
///
/// The caller initializes once, then calls [`LocalSearch::next_step`] until
/// it returns `false`. Each `true` step leaves the context's partition and
/// objective describing the same (possibly new) state.
///
/// # Examples
///
/// ```
/// use u_grouping::climb::SimpleHillClimber;
/// use u_grouping::objective::Utilitarian;
/// use u_grouping::partition::{Partition, WeightMatrix};
/// use u_grouping::search::{LocalSearch, SearchContext};
/// use u_numflow::random::create_rng;
///
/// let mut rng = create_rng(42);
/// let weights = WeightMatrix::random(12, &mut rng);
/// let mut partition = Partition::random(12, 3, &mut rng).unwrap();
/// let mut objective = Utilitarian::new();
/// let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, rng).unwrap();
///
/// let mut climber = SimpleHillClimber::new();
/// climber.initialize(&mut ctx);
/// while climber.next_step(&mut ctx) {}
/// assert!(ctx.partition().is_valid());
/// ```
pub trait LocalSearch {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Resets counters and per-run state.
    fn initialize<O, R>(&mut self, ctx: &mut SearchContext<'_, O, R>)
    where
        O: Objective + ?Sized,
        R: Rng;

    /// Attempts one step. `false` means no further step is possible.
    fn next_step<O, R>(&mut self, ctx: &mut SearchContext<'_, O, R>) -> bool
    where
        O: Objective + ?Sized,
        R: Rng;

    /// Steps taken since initialization.
    fn num_steps(&self) -> usize;

    /// Moves evaluated during the most recent step.
    fn num_neighbors(&self) -> usize;
}
