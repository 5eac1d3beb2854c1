//! Convex combination of the utilitarian and minmax objectives.

use super::{check_alpha, compare_scalar, MinMax, Objective, Utilitarian};
use crate::error::Result;
use crate::partition::{swap_pairs, GroupMask, Partition, WeightMatrix};
use std::cmp::Ordering;

/// `alpha · utilitarian + (1 − alpha) · minmax`.
///
/// Both halves are updated on every add and remove. Comparison is on the
/// combined scalar only, and the "to" mask is never narrowed.
#[derive(Debug, Clone)]
pub struct Mixed {
    alpha: f64,
    util: Utilitarian,
    minmax: MinMax,
    last_value: f64,
}

impl Mixed {
    /// Fails unless `alpha ∈ [0, 1]`.
    pub fn new(alpha: f64) -> Result<Self> {
        check_alpha(alpha)?;
        Ok(Self {
            alpha,
            util: Utilitarian::new(),
            minmax: MinMax::new(),
            last_value: 0.0,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn combine(&self, util: f64, minmax: f64) -> f64 {
        self.alpha * util + (1.0 - self.alpha) * minmax
    }
}

impl Objective for Mixed {
    fn name(&self) -> &'static str {
        "mixed"
    }

    fn value(&self) -> f64 {
        debug_assert!(self.is_initialized(), "mixed objective read before initialize");
        self.combine(self.util.value(), self.minmax.value())
    }

    fn is_initialized(&self) -> bool {
        self.util.is_initialized() && self.minmax.is_initialized()
    }

    fn min_value(&self, n: usize, k: usize) -> f64 {
        self.combine(self.util.min_value(n, k), self.minmax.min_value(n, k))
    }

    fn max_value(&self, n: usize, k: usize) -> f64 {
        self.combine(self.util.max_value(n, k), self.minmax.max_value(n, k))
    }

    fn max_delta_value(&self, n: usize, k: usize) -> f64 {
        self.combine(
            self.util.max_delta_value(n, k),
            self.minmax.max_delta_value(n, k),
        )
    }

    fn expected_neighborhood_size(&self, n: usize, k: usize) -> usize {
        swap_pairs(n, k)
    }

    fn calculate(&self, partition: &Partition, weights: &WeightMatrix) -> f64 {
        self.combine(
            Utilitarian::total(partition, weights) as f64,
            MinMax::worst_score(partition, weights) as f64,
        )
    }

    fn initialize(&mut self, partition: &Partition, weights: &WeightMatrix) {
        self.util.initialize(partition, weights);
        self.minmax.initialize(partition, weights);
    }

    fn reset(&mut self, n: usize, k: usize) {
        self.util.reset(n, k);
        self.minmax.reset(n, k);
    }

    fn set_now_as_ref_point(&mut self) {
        self.last_value = self.value();
    }

    fn compare_to_last_ref_point(&self) -> Ordering {
        compare_scalar(self.value(), self.last_value)
    }

    fn add_member(
        &mut self,
        group_index: usize,
        group: &[usize],
        weights: &WeightMatrix,
        add_index: usize,
        person: usize,
    ) {
        self.util
            .add_member(group_index, group, weights, add_index, person);
        self.minmax
            .add_member(group_index, group, weights, add_index, person);
    }

    fn remove_member(
        &mut self,
        group: &[usize],
        weights: &WeightMatrix,
        sub_index: usize,
        person: usize,
    ) {
        self.util.remove_member(group, weights, sub_index, person);
        self.minmax.remove_member(group, weights, sub_index, person);
    }

    fn valid_group_indices(&self, _from: &mut GroupMask, _to: &mut GroupMask) {}
}
