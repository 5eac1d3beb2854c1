//! Worst individual score.

use super::{individual_scores, Objective};
use crate::numeric::{self, EPSILON};
use crate::partition::{GroupMask, Partition, WeightMatrix};
use std::cell::Cell;
use std::cmp::Ordering;

/// Cached location of the worst individual score.
#[derive(Debug, Clone, Copy, Default)]
struct Worst {
    index: usize,
    ties: usize,
}

/// Minmax (egalitarian) objective: `max_p individual(p)`.
///
/// Keeps every person's score and the group each person sits in. Finding
/// the worst person is deferred until [`Objective::value`] or
/// [`Objective::valid_group_indices`] reads it, so a tentative swap costs
/// `O(g)` and only a read costs `O(n)`.
///
/// At equal value, the state with fewer people tied at the worst score
/// compares as better.
#[derive(Debug, Clone, Default)]
pub struct MinMax {
    scores: Vec<i64>,
    group_of: Vec<usize>,
    worst: Cell<Option<Worst>>,
    initialized: bool,
    last_value: f64,
    last_ties: usize,
}

impl MinMax {
    pub fn new() -> Self {
        Self::default()
    }

    /// From-scratch worst score.
    pub fn worst_score(partition: &Partition, weights: &WeightMatrix) -> i64 {
        individual_scores(partition, weights)
            .into_iter()
            .max()
            .unwrap_or(0)
    }

    /// Number of people currently tied at the worst score.
    pub fn num_worst(&self) -> usize {
        self.worst().ties
    }

    /// Individual score of every person, indexed by id.
    pub fn scores(&self) -> &[i64] {
        &self.scores
    }

    fn worst(&self) -> Worst {
        if let Some(worst) = self.worst.get() {
            return worst;
        }
        let mut worst = Worst { index: 0, ties: 1 };
        for (i, &score) in self.scores.iter().enumerate().skip(1) {
            match score.cmp(&self.scores[worst.index]) {
                Ordering::Greater => worst = Worst { index: i, ties: 1 },
                Ordering::Equal => worst.ties += 1,
                Ordering::Less => {}
            }
        }
        self.worst.set(Some(worst));
        worst
    }

    fn worst_value(&self) -> i64 {
        self.scores
            .get(self.worst().index)
            .copied()
            .unwrap_or(0)
    }
}

impl Objective for MinMax {
    fn name(&self) -> &'static str {
        "minmax"
    }

    fn value(&self) -> f64 {
        debug_assert!(self.is_initialized(), "minmax objective read before initialize");
        self.worst_value() as f64
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn min_value(&self, n: usize, k: usize) -> f64 {
        (n / k - 1) as f64
    }

    fn max_value(&self, n: usize, k: usize) -> f64 {
        (n as f64) * ((n / k - 1) as f64)
    }

    fn max_delta_value(&self, n: usize, k: usize) -> f64 {
        self.max_value(n, k) - self.min_value(n, k)
    }

    /// Assumes a single worst person: their group mates can each swap with
    /// anyone outside the group.
    fn expected_neighborhood_size(&self, n: usize, k: usize) -> usize {
        let g = n / k;
        g * (n - g)
    }

    fn calculate(&self, partition: &Partition, weights: &WeightMatrix) -> f64 {
        Self::worst_score(partition, weights) as f64
    }

    fn initialize(&mut self, partition: &Partition, weights: &WeightMatrix) {
        self.reset(weights.len(), partition.num_groups());
        self.scores = individual_scores(partition, weights);
        self.group_of = partition.group_of_each();
    }

    fn reset(&mut self, n: usize, _k: usize) {
        self.scores.clear();
        self.scores.resize(n, 0);
        self.group_of.clear();
        self.group_of.resize(n, 0);
        self.worst.set(None);
        self.initialized = true;
    }

    fn set_now_as_ref_point(&mut self) {
        self.last_value = self.value();
        self.last_ties = self.num_worst();
    }

    fn compare_to_last_ref_point(&self) -> Ordering {
        let value = self.value();
        if numeric::is_close(value, self.last_value, EPSILON) {
            self.last_ties.cmp(&self.num_worst())
        } else if value < self.last_value {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    fn add_member(
        &mut self,
        group_index: usize,
        group: &[usize],
        weights: &WeightMatrix,
        add_index: usize,
        person: usize,
    ) {
        debug_assert!(self.is_initialized());
        let mut gained = 0;
        for (i, &mate) in group.iter().enumerate() {
            if i == add_index {
                continue;
            }
            self.scores[mate] += weights.get(mate, person);
            gained += weights.get(person, mate);
        }
        self.scores[person] += gained;
        self.group_of[person] = group_index;
        self.worst.set(None);
    }

    fn remove_member(
        &mut self,
        group: &[usize],
        weights: &WeightMatrix,
        sub_index: usize,
        person: usize,
    ) {
        debug_assert!(self.is_initialized());
        let mut lost = 0;
        for (i, &mate) in group.iter().enumerate() {
            if i == sub_index {
                continue;
            }
            self.scores[mate] -= weights.get(mate, person);
            lost += weights.get(person, mate);
        }
        self.scores[person] -= lost;
        self.worst.set(None);
    }

    /// Restricts the "to" side to groups holding a currently worst person.
    fn valid_group_indices(&self, _from: &mut GroupMask, to: &mut GroupMask) {
        to.fill(false);
        let worst = self.worst_value();
        for (person, &score) in self.scores.iter().enumerate() {
            if score == worst {
                to.insert(self.group_of[person]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::fixtures;
    use crate::partition::NeighborDelta;

    #[test]
    fn test_simple_value() {
        let (partition, weights) = fixtures::simple();
        let mut objective = MinMax::new();
        objective.initialize(&partition, &weights);
        // Persons 2 and 3 rank each other at 3.
        assert_eq!(objective.value(), 3.0);
        assert_eq!(objective.num_worst(), 2);
        assert_eq!(objective.calculate(&partition, &weights), 3.0);
    }

    #[test]
    fn test_tie_compare_to_last_ref_point() {
        let (mut partition, weights) = fixtures::minmax_tie();
        let mut objective = MinMax::new();
        objective.initialize(&partition, &weights);
        let prev_value = objective.value();

        let mut from = GroupMask::full(3);
        let mut to = GroupMask::full(3);
        objective.valid_group_indices(&mut from, &mut to);
        assert_eq!(from, GroupMask::full(3));
        assert_eq!(to, GroupMask::full(3));

        objective.set_now_as_ref_point();
        assert_eq!(objective.compare_to_last_ref_point(), Ordering::Equal);

        // Same worst value, fewer people tied at it.
        let delta = NeighborDelta::new(0, 0, 1, 0);
        objective.apply_delta(&partition, &weights, &delta);
        partition.swap(&delta);
        objective.valid_group_indices(&mut from, &mut to);
        assert_eq!(from, GroupMask::full(3));
        assert_eq!(to, GroupMask::from_indices(3, &[2]));
        assert!((objective.value() - prev_value).abs() < 1e-4);
        assert_eq!(objective.compare_to_last_ref_point(), Ordering::Greater);

        objective.set_now_as_ref_point();
        assert_eq!(objective.compare_to_last_ref_point(), Ordering::Equal);

        // Back to the wider tie.
        objective.apply_delta(&partition, &weights, &delta);
        partition.swap(&delta);
        from.fill(true);
        to.fill(true);
        objective.valid_group_indices(&mut from, &mut to);
        assert_eq!(to, GroupMask::full(3));
        assert_eq!(objective.compare_to_last_ref_point(), Ordering::Less);
    }

    #[test]
    fn test_reset_is_zero_state() {
        let mut objective = MinMax::new();
        objective.reset(4, 2);
        assert!(objective.is_initialized());
        assert_eq!(objective.value(), 0.0);
        assert_eq!(objective.num_worst(), 4);
    }
}
