//! Mutable state shared by every local search.

use crate::error::{GroupingError, Result};
use crate::objective::Objective;
use crate::partition::{GroupMask, NeighborDelta, Partition, WeightMatrix};
use rand::Rng;

/// Borrowed problem data plus the scratch state a search needs.
///
/// The partition and objective are borrowed mutably for the whole run and
/// always describe the same state between calls: every move goes through
/// [`SearchContext::apply_delta`], which updates the objective before
/// swapping the partition. The context owns the RNG and the two group masks.
pub struct SearchContext<'a, O: Objective + ?Sized, R: Rng> {
    partition: &'a mut Partition,
    weights: &'a WeightMatrix,
    objective: &'a mut O,
    rng: R,
    from: GroupMask,
    to: GroupMask,
}

impl<'a, O: Objective + ?Sized, R: Rng> SearchContext<'a, O, R> {
    /// Checks that `weights` matches `partition`, then initializes the
    /// objective from scratch.
    pub fn new(
        partition: &'a mut Partition,
        weights: &'a WeightMatrix,
        objective: &'a mut O,
        rng: R,
    ) -> Result<Self> {
        let n = partition.num_people();
        if weights.len() != n {
            return Err(GroupingError::SizeMismatch {
                weights: weights.len(),
                partition: n,
            });
        }
        objective.initialize(partition, weights);
        let k = partition.num_groups();
        Ok(Self {
            partition,
            weights,
            objective,
            rng,
            from: GroupMask::full(k),
            to: GroupMask::full(k),
        })
    }

    /// Current objective value.
    pub fn value(&self) -> f64 {
        self.objective.value()
    }

    pub fn partition(&self) -> &Partition {
        self.partition
    }

    pub fn weights(&self) -> &WeightMatrix {
        self.weights
    }

    pub fn objective(&self) -> &O {
        self.objective
    }

    pub fn objective_mut(&mut self) -> &mut O {
        self.objective
    }

    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// `(n, k)` of the partition.
    pub fn dims(&self) -> (usize, usize) {
        (self.partition.num_people(), self.partition.num_groups())
    }

    /// The "from" and "to" masks set by the last
    /// [`SearchContext::refresh_group_masks`].
    pub fn masks(&self) -> (&GroupMask, &GroupMask) {
        (&self.from, &self.to)
    }

    /// Refills both masks and lets the objective narrow them.
    pub fn refresh_group_masks(&mut self) {
        let k = self.partition.num_groups();
        self.from.reset(k, true);
        self.to.reset(k, true);
        self.objective.valid_group_indices(&mut self.from, &mut self.to);
    }

    /// Applies `delta` to the objective, then to the partition.
    pub fn apply_delta(&mut self, delta: &NeighborDelta) {
        self.objective.apply_delta(self.partition, self.weights, delta);
        self.partition.swap(delta);
    }

    /// Undoes a previous [`SearchContext::apply_delta`] of the same move.
    pub fn unapply_delta(&mut self, delta: &NeighborDelta) {
        self.apply_delta(delta);
    }

    /// Reshuffles the partition and reinitializes the objective.
    pub fn randomize(&mut self) {
        self.partition.randomize(&mut self.rng);
        self.objective.initialize(self.partition, self.weights);
    }

    /// Overwrites the partition with a same-shaped `partition` and
    /// reinitializes the objective.
    pub fn restore(&mut self, partition: &Partition) {
        debug_assert_eq!(partition.group_sizes(), self.partition.group_sizes());
        self.partition.clone_from(partition);
        self.objective.initialize(self.partition, self.weights);
    }

    /// Releases the RNG so a caller can continue the same stream.
    pub fn into_rng(self) -> R {
        self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::{MinMax, Utilitarian};
    use u_numflow::random::create_rng;

    #[test]
    fn test_size_mismatch() {
        let mut rng = create_rng(42);
        let mut partition = Partition::random(6, 2, &mut rng).unwrap();
        let weights = WeightMatrix::random(8, &mut rng);
        let mut objective = Utilitarian::new();
        let err = SearchContext::new(&mut partition, &weights, &mut objective, rng)
            .err()
            .unwrap();
        assert_eq!(err, GroupingError::SizeMismatch { weights: 8, partition: 6 });
    }

    #[test]
    fn test_apply_unapply_roundtrip() {
        let mut rng = create_rng(42);
        let mut partition = Partition::random(9, 3, &mut rng).unwrap();
        let original = partition.clone();
        let weights = WeightMatrix::random(9, &mut rng);
        let mut objective = Utilitarian::new();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, rng).unwrap();
        let before = ctx.value();

        let delta = NeighborDelta::new(0, 1, 2, 2);
        ctx.apply_delta(&delta);
        assert_eq!(
            ctx.value(),
            ctx.objective().calculate(ctx.partition(), ctx.weights())
        );
        ctx.unapply_delta(&delta);
        assert_eq!(ctx.value(), before);
        assert_eq!(ctx.partition(), &original);
    }

    #[test]
    fn test_refresh_masks_minmax_narrows() {
        let (mut partition, weights) = crate::objective::fixtures::simple();
        let mut objective = MinMax::new();
        let rng = create_rng(42);
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, rng).unwrap();
        ctx.refresh_group_masks();
        let (from, to) = ctx.masks();
        assert_eq!(from.count(), 2);
        assert_eq!(to.iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_randomize_keeps_objective_in_sync() {
        let mut rng = create_rng(42);
        let mut partition = Partition::random(12, 3, &mut rng).unwrap();
        let weights = WeightMatrix::random(12, &mut rng);
        let mut objective = MinMax::new();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, rng).unwrap();
        ctx.randomize();
        assert!(ctx.partition().is_valid());
        assert_eq!(
            ctx.value(),
            ctx.objective().calculate(ctx.partition(), ctx.weights())
        );
    }
}
