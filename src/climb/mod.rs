//! Hill-climbing family.
//!
//! Every climber follows the same step skeleton: let the objective narrow
//! the group masks, re-initialize a neighbor generator, snapshot a
//! reference point, then evaluate moves by tentatively applying them and
//! undoing the rejected ones.
//!
//! | Climber | Generator | Accepts |
//! |---------|-----------|---------|
//! | [`SimpleHillClimber`] | lexical | first improving move |
//! | [`SteepestAscentHillClimber`] | lexical | best improving move |
//! | [`FirstChoiceHillClimber`] | random, capped | first improving move |
//! | [`StochasticHillClimber`] | random, capped | improving move with probability `1 / (1 + exp(Δ/t))` |
//! | [`RandomRestartHillClimber`] | inner climber's | inner climber's, restarting from random partitions |
//!
//! # References
//!
//! - Russell & Norvig (2010), "Artificial Intelligence: A Modern Approach", §4.1
//! - Selman & Gomes (2006), "Hill-climbing search"

mod first_choice;
mod restart;
mod simple;
mod steepest;
mod stochastic;

pub use first_choice::FirstChoiceHillClimber;
pub use restart::RandomRestartHillClimber;
pub use simple::SimpleHillClimber;
pub use steepest::SteepestAscentHillClimber;
pub use stochastic::StochasticHillClimber;

use crate::neighbor::NeighborGenerator;
use crate::objective::Objective;
use crate::search::SearchContext;
use rand::Rng;
use std::cmp::Ordering;

/// Applies the first move that beats the reference point, undoing the rest.
///
/// `accept(current, next, rng)` is consulted only for improving moves.
/// Returns whether a move was kept; `num_neighbors` counts evaluated moves.
pub(crate) fn first_improvement<G, O, R, F>(
    generator: &mut G,
    ctx: &mut SearchContext<'_, O, R>,
    num_neighbors: &mut usize,
    mut accept: F,
) -> bool
where
    G: NeighborGenerator,
    O: Objective + ?Sized,
    R: Rng,
    F: FnMut(f64, f64, &mut R) -> bool,
{
    ctx.refresh_group_masks();
    let (from, to) = ctx.masks();
    generator.initialize(ctx.partition(), from, to);
    let current = ctx.value();
    ctx.objective_mut().set_now_as_ref_point();
    *num_neighbors = 0;

    while let Some(delta) = generator.next_move(ctx.rng()) {
        *num_neighbors += 1;
        ctx.apply_delta(&delta);
        if ctx.objective().compare_to_last_ref_point() == Ordering::Greater {
            let next = ctx.value();
            if accept(current, next, ctx.rng()) {
                return true;
            }
        }
        ctx.unapply_delta(&delta);
    }
    false
}
