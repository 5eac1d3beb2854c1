//! Per-person scores.

use crate::partition::{Partition, WeightMatrix};

/// Sum of `weights[person][mate]` over the mates of the person sitting at
/// `member_index` in `group`.
pub fn individual(group: &[usize], weights: &WeightMatrix, member_index: usize) -> i64 {
    let row = weights.row(group[member_index]);
    group
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != member_index)
        .map(|(_, &mate)| row[mate])
        .sum()
}

/// Individual score of every person, indexed by person id.
pub fn individual_scores(partition: &Partition, weights: &WeightMatrix) -> Vec<i64> {
    let mut scores = vec![0; partition.num_people()];
    for group in partition.groups() {
        for (j, &person) in group.iter().enumerate() {
            scores[person] = individual(group, weights, j);
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::fixtures;

    #[test]
    fn test_individual_skips_self() {
        let weights = WeightMatrix::new(vec![
            vec![0, 1, 1, 1],
            vec![1, 0, 1, 1],
            vec![1, 1, 0, 1],
            vec![1, 2, 3, 0],
        ])
        .unwrap();
        assert_eq!(individual(&[1, 2, 3], &weights, 2), 2 + 3);
    }

    #[test]
    fn test_scores_on_simple_pairs() {
        let (partition, weights) = fixtures::simple();
        assert_eq!(individual_scores(&partition, &weights), vec![1, 1, 3, 3]);
    }
}
