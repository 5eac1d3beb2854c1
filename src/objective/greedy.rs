//! Greedy construction of a starting partition.

use super::Objective;
use crate::error::Result;
use crate::numeric::EPSILON;
use crate::partition::{group_size, Partition, WeightMatrix};

/// Fills `k` groups in order, seeding each with the next unplaced person and
/// then adding whichever remaining candidate yields the lowest objective.
///
/// Candidates are scanned in pool order and only a strict improvement by
/// more than [`EPSILON`] replaces the current pick. On return the objective
/// holds the value of the returned partition.
pub fn greedy_partition<O>(objective: &mut O, weights: &WeightMatrix, k: usize) -> Result<Partition>
where
    O: Objective + ?Sized,
{
    let n = weights.len();
    let size = group_size(n, k)?;
    objective.reset(n, k);

    let mut pool: Vec<usize> = (0..n).collect();
    let mut next = 0;
    let mut groups = Vec::with_capacity(k);

    for group_index in 0..k {
        let mut group = Vec::with_capacity(size);
        objective.add_member(group_index, &group, weights, 0, pool[next]);
        group.push(pool[next]);
        next += 1;

        for slot in 1..size {
            let mut best = next;
            let mut best_value = f64::INFINITY;
            for (offset, &candidate) in pool[next..].iter().enumerate() {
                objective.add_member(group_index, &group, weights, slot, candidate);
                let value = objective.value();
                if value + EPSILON < best_value {
                    best = next + offset;
                    best_value = value;
                }
                objective.remove_member(&group, weights, slot, candidate);
            }
            objective.add_member(group_index, &group, weights, slot, pool[best]);
            group.push(pool[best]);
            pool.swap(best, next);
            next += 1;
        }
        groups.push(group);
    }

    Partition::new(groups)
}
