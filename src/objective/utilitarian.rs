//! Sum of individual scores.

use super::{compare_scalar, individual, Objective};
use crate::partition::{swap_pairs, GroupMask, Partition, WeightMatrix};
use std::cmp::Ordering;

/// Utilitarian objective: `Σ_p individual(p)`.
///
/// A swap touches `2(g − 1)` ordered pairs per side, so the running sum is
/// adjusted in `O(g)`.
#[derive(Debug, Clone, Default)]
pub struct Utilitarian {
    value: Option<i64>,
    last_value: f64,
}

impl Utilitarian {
    pub fn new() -> Self {
        Self::default()
    }

    /// From-scratch sum.
    pub fn total(partition: &Partition, weights: &WeightMatrix) -> i64 {
        partition
            .groups()
            .iter()
            .map(|group| {
                (0..group.len())
                    .map(|j| individual(group, weights, j))
                    .sum::<i64>()
            })
            .sum()
    }

    fn pair_sum(group: &[usize], weights: &WeightMatrix, skip: usize, person: usize) -> i64 {
        group
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip)
            .map(|(_, &mate)| weights.get(mate, person) + weights.get(person, mate))
            .sum()
    }
}

impl Objective for Utilitarian {
    fn name(&self) -> &'static str {
        "utilitarian"
    }

    fn value(&self) -> f64 {
        debug_assert!(self.is_initialized(), "utilitarian objective read before initialize");
        self.value.unwrap_or(0) as f64
    }

    fn is_initialized(&self) -> bool {
        self.value.is_some()
    }

    fn min_value(&self, n: usize, k: usize) -> f64 {
        (n * (n / k - 1)) as f64
    }

    fn max_value(&self, n: usize, k: usize) -> f64 {
        (n as f64) * (n as f64) * ((n / k - 1) as f64)
    }

    fn max_delta_value(&self, n: usize, k: usize) -> f64 {
        (4 * (n - 1) * (n / k - 1)) as f64
    }

    fn expected_neighborhood_size(&self, n: usize, k: usize) -> usize {
        swap_pairs(n, k)
    }

    fn calculate(&self, partition: &Partition, weights: &WeightMatrix) -> f64 {
        Self::total(partition, weights) as f64
    }

    fn initialize(&mut self, partition: &Partition, weights: &WeightMatrix) {
        self.value = Some(Self::total(partition, weights));
    }

    fn reset(&mut self, _n: usize, _k: usize) {
        self.value = Some(0);
    }

    fn set_now_as_ref_point(&mut self) {
        self.last_value = self.value();
    }

    fn compare_to_last_ref_point(&self) -> Ordering {
        compare_scalar(self.value(), self.last_value)
    }

    fn add_member(
        &mut self,
        _group_index: usize,
        group: &[usize],
        weights: &WeightMatrix,
        add_index: usize,
        person: usize,
    ) {
        debug_assert!(self.is_initialized());
        if let Some(value) = self.value.as_mut() {
            *value += Self::pair_sum(group, weights, add_index, person);
        }
    }

    fn remove_member(
        &mut self,
        group: &[usize],
        weights: &WeightMatrix,
        sub_index: usize,
        person: usize,
    ) {
        debug_assert!(self.is_initialized());
        if let Some(value) = self.value.as_mut() {
            *value -= Self::pair_sum(group, weights, sub_index, person);
        }
    }

    fn valid_group_indices(&self, _from: &mut GroupMask, _to: &mut GroupMask) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::fixtures;
    use crate::partition::NeighborDelta;

    #[test]
    fn test_simple_value() {
        let (partition, weights) = fixtures::simple();
        let mut objective = Utilitarian::new();
        assert!(!objective.is_initialized());
        objective.initialize(&partition, &weights);
        assert_eq!(objective.value(), (1 + 1 + 3 + 3) as f64);
        assert_eq!(objective.calculate(&partition, &weights), 8.0);
    }

    #[test]
    fn test_compare_after_swap() {
        let (mut partition, weights) = fixtures::simple();
        let mut objective = Utilitarian::new();
        objective.initialize(&partition, &weights);
        objective.set_now_as_ref_point();
        assert_eq!(objective.compare_to_last_ref_point(), Ordering::Equal);

        // Every pairing of the simple fixture sums to 8.
        for delta in [NeighborDelta::new(0, 0, 1, 0), NeighborDelta::new(0, 0, 1, 1)] {
            objective.apply_delta(&partition, &weights, &delta);
            partition.swap(&delta);
            assert_eq!(objective.compare_to_last_ref_point(), Ordering::Equal);
            assert_eq!(objective.value(), objective.calculate(&partition, &weights));
        }

        let (partition, weights) = fixtures::minmax_tie();
        objective.initialize(&partition, &weights);
        objective.set_now_as_ref_point();
        let mut partition = partition;
        let delta = NeighborDelta::new(0, 0, 1, 0);
        objective.apply_delta(&partition, &weights, &delta);
        partition.swap(&delta);
        assert_eq!(objective.compare_to_last_ref_point(), Ordering::Greater);
    }

    #[test]
    fn test_masks_untouched() {
        let objective = Utilitarian::new();
        let mut from = GroupMask::full(3);
        let mut to = GroupMask::full(3);
        objective.valid_group_indices(&mut from, &mut to);
        assert_eq!(from.count(), 3);
        assert_eq!(to.count(), 3);
    }
}
