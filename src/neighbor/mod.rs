//! Neighbor generators: lazy sequences of swap moves.
//!
//! A generator is (re)initialized from the current partition and two group
//! masks. The "from" mask restricts which groups may supply the first slot
//! of a move, the "to" mask which may supply the second. Re-initializing
//! restarts the sequence.
//!
//! - [`LexicalGenerator`]: every valid unordered cross-group pair exactly
//!   once, ascending by `(group, slot)`
//! - [`RandomGenerator`]: uniformly drawn moves with replacement, optionally
//!   capped

mod lexical;
mod random;

pub use lexical::LexicalGenerator;
pub use random::{max_gen_bound, RandomGenerator};

use crate::partition::{GroupMask, NeighborDelta, Partition};
use rand::Rng;

/// Source of candidate moves for one search step.
pub trait NeighborGenerator {
    /// Prepares a fresh sequence over `partition` restricted by the masks.
    fn initialize(&mut self, partition: &Partition, from: &GroupMask, to: &GroupMask);

    fn is_initialized(&self) -> bool;

    /// Next move, or `None` once the sequence is exhausted.
    fn next_move<R: Rng>(&mut self, rng: &mut R) -> Option<NeighborDelta>;
}
