//! Objectives over equal-size partitions.
//!
//! Every objective is **minimized**: weights are rank-like costs where a
//! lower weight means a more welcome group mate. An objective caches enough
//! state to absorb a single swap in `O(g)` time via
//! [`Objective::apply_delta`], and always agrees with the from-scratch
//! [`Objective::calculate`] up to [`EPSILON`].
//!
//! # Variants
//!
//! - [`Utilitarian`]: sum of every person's individual score
//! - [`MinMax`]: the worst individual score; ties at the worst value break
//!   comparisons so that shrinking the set of worst-off people counts as
//!   progress
//! - [`Mixed`]: `α·utilitarian + (1 − α)·minmax`
//!
//! # References
//!
//! - Irving (1985), "An efficient algorithm for the stable roommates problem"
//! - Rawls (1971), "A Theory of Justice" (maximin fairness)

mod greedy;
mod individual;
mod minmax;
mod mixed;
mod utilitarian;

pub use greedy::greedy_partition;
pub use individual::{individual, individual_scores};
pub use minmax::MinMax;
pub use mixed::Mixed;
pub use utilitarian::Utilitarian;

use crate::error::{GroupingError, Result};
use crate::numeric::{self, EPSILON};
use crate::partition::{GroupMask, NeighborDelta, Partition, WeightMatrix};
use std::cmp::Ordering;
use std::fmt;

/// An incrementally maintained partition objective.
///
/// `add_member` and `remove_member` must be called *before* the partition is
/// mutated: `group` is the slice as it currently stands and the slot at
/// `add_index` / `sub_index` is skipped when summing over group mates.
pub trait Objective: fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Current value. Debug builds assert the objective is initialized.
    fn value(&self) -> f64;

    fn is_initialized(&self) -> bool;

    /// Smallest achievable value for `n` persons in `k` groups.
    fn min_value(&self, n: usize, k: usize) -> f64;

    /// Largest achievable value for `n` persons in `k` groups.
    fn max_value(&self, n: usize, k: usize) -> f64;

    /// Upper bound on `|value(a) − value(b)|` for neighboring partitions.
    fn max_delta_value(&self, n: usize, k: usize) -> f64;

    /// Typical number of moves a generator yields per step.
    fn expected_neighborhood_size(&self, n: usize, k: usize) -> usize;

    /// From-scratch value of `partition`, ignoring cached state.
    fn calculate(&self, partition: &Partition, weights: &WeightMatrix) -> f64;

    /// Recomputes every cache from `partition`.
    fn initialize(&mut self, partition: &Partition, weights: &WeightMatrix);

    /// Zero state for `n` persons in `k` groups, with nobody placed.
    fn reset(&mut self, n: usize, k: usize);

    /// Snapshots the current value for [`Objective::compare_to_last_ref_point`].
    fn set_now_as_ref_point(&mut self);

    /// `Greater` when the current state is better than the snapshot,
    /// `Equal` when indistinguishable, `Less` when worse.
    fn compare_to_last_ref_point(&self) -> Ordering;

    /// Accounts for `person` joining `group` at `add_index`.
    fn add_member(
        &mut self,
        group_index: usize,
        group: &[usize],
        weights: &WeightMatrix,
        add_index: usize,
        person: usize,
    );

    /// Accounts for `person` leaving `group` from `sub_index`.
    fn remove_member(
        &mut self,
        group: &[usize],
        weights: &WeightMatrix,
        sub_index: usize,
        person: usize,
    );

    /// Narrows which groups may supply each side of the next swap.
    ///
    /// Both masks arrive full; objectives that gain nothing from
    /// restriction leave them untouched.
    fn valid_group_indices(&self, from: &mut GroupMask, to: &mut GroupMask);

    /// `remove_member` followed by `add_member` at the same slot.
    fn replace_member(
        &mut self,
        group_index: usize,
        group: &[usize],
        weights: &WeightMatrix,
        replace_index: usize,
        sub_person: usize,
        add_person: usize,
    ) {
        debug_assert!(
            !group.contains(&add_person),
            "person {add_person} is already in group {group_index}"
        );
        self.remove_member(group, weights, replace_index, sub_person);
        self.add_member(group_index, group, weights, replace_index, add_person);
    }

    /// Updates the objective for `delta`; the caller swaps the partition
    /// afterwards.
    ///
    /// Undoing a move is the same call made after the swap.
    fn apply_delta(&mut self, partition: &Partition, weights: &WeightMatrix, delta: &NeighborDelta) {
        debug_assert_ne!(delta.group1, delta.group2, "move within one group");
        let person1 = partition.person(delta.group1, delta.member1);
        let person2 = partition.person(delta.group2, delta.member2);
        self.replace_member(
            delta.group1,
            partition.group(delta.group1),
            weights,
            delta.member1,
            person1,
            person2,
        );
        self.replace_member(
            delta.group2,
            partition.group(delta.group2),
            weights,
            delta.member2,
            person2,
            person1,
        );
    }

    /// Value mapped onto `[0, 1]` between the closed-form bounds.
    fn normalized_value(&self, n: usize, k: usize) -> f64 {
        numeric::normalize(self.value(), self.min_value(n, k), self.max_value(n, k))
    }
}

/// Three-way comparison of plain scalar values, lower is better.
pub(crate) fn compare_scalar(value: f64, last_value: f64) -> Ordering {
    if numeric::is_close(value, last_value, EPSILON) {
        Ordering::Equal
    } else if value < last_value {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Selects an objective without naming its concrete type.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectiveKind {
    /// Sum of individual scores.
    Utilitarian,
    /// Worst individual score.
    MinMax,
    /// `alpha` weights the utilitarian part, `1 − alpha` the minmax part.
    Mixed { alpha: f64 },
}

impl ObjectiveKind {
    /// Builds a fresh, uninitialized objective.
    pub fn build(&self) -> Result<Box<dyn Objective>> {
        Ok(match *self {
            ObjectiveKind::Utilitarian => Box::new(Utilitarian::new()),
            ObjectiveKind::MinMax => Box::new(MinMax::new()),
            ObjectiveKind::Mixed { alpha } => Box::new(Mixed::new(alpha)?),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObjectiveKind::Utilitarian => "utilitarian",
            ObjectiveKind::MinMax => "minmax",
            ObjectiveKind::Mixed { .. } => "mixed",
        }
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveKind::Mixed { alpha } => write!(f, "mixed({alpha})"),
            other => f.write_str(other.name()),
        }
    }
}

pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if numeric::is_between(alpha, 0.0, 1.0) {
        Ok(())
    } else {
        Err(GroupingError::InvalidConfig(format!(
            "mixed alpha must be in [0, 1], got {alpha}"
        )))
    }
}
