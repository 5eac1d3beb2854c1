//! Equal-size group assignment.

use super::delta::NeighborDelta;
use crate::error::{GroupingError, Result};
use rand::Rng;
use std::fmt;

/// An assignment of persons `0..n` to disjoint, ordered groups.
///
/// Every person appears in exactly one slot of one group. Group sizes are
/// fixed at construction; local search only exchanges occupants between
/// slots, so the shape never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partition {
    groups: Vec<Vec<usize>>,
}

impl Partition {
    /// Builds a partition from explicit groups.
    ///
    /// Fails if there are no groups, a group is empty, or the ids are not a
    /// permutation of `0..n`.
    pub fn new(groups: Vec<Vec<usize>>) -> Result<Self> {
        if groups.is_empty() || groups.iter().any(|g| g.is_empty()) {
            return Err(GroupingError::EmptyGroup);
        }
        let n: usize = groups.iter().map(Vec::len).sum();
        let mut seen = vec![false; n];
        for &person in groups.iter().flatten() {
            if person >= n {
                return Err(GroupingError::PersonOutOfRange { person, n });
            }
            if std::mem::replace(&mut seen[person], true) {
                return Err(GroupingError::DuplicatePerson(person));
            }
        }
        Ok(Self { groups })
    }

    /// Persons `0..n` assigned in order to `k` groups of size `n / k`.
    pub fn sequential(n: usize, k: usize) -> Result<Self> {
        let size = group_size(n, k)?;
        let groups = (0..k)
            .map(|m| (m * size..(m + 1) * size).collect())
            .collect();
        Ok(Self { groups })
    }

    /// A uniformly random partition of `n` persons into `k` equal groups.
    pub fn random<R: Rng>(n: usize, k: usize, rng: &mut R) -> Result<Self> {
        let mut partition = Self::sequential(n, k)?;
        partition.randomize(rng);
        Ok(partition)
    }

    /// Reshuffles every person into a uniformly random slot, keeping the
    /// group sizes.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        let mut ids: Vec<usize> = (0..self.num_people()).collect();
        u_numflow::random::shuffle(&mut ids, rng);
        let mut ids = ids.into_iter();
        for slot in self.groups.iter_mut().flatten() {
            if let Some(id) = ids.next() {
                *slot = id;
            }
        }
    }

    /// All groups, in order.
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// The members of group `index`.
    pub fn group(&self, index: usize) -> &[usize] {
        &self.groups[index]
    }

    /// Number of groups `k`.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Number of persons `n`.
    pub fn num_people(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Size of every group, in order.
    pub fn group_sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }

    /// Occupant of slot `member` in group `group`.
    #[inline]
    pub fn person(&self, group: usize, member: usize) -> usize {
        self.groups[group][member]
    }

    /// Exchanges the occupants of the two slots named by `delta`.
    ///
    /// Self-inverse: applying the same move twice restores the partition.
    #[inline]
    pub fn swap(&mut self, delta: &NeighborDelta) {
        debug_assert_ne!(delta.group1, delta.group2, "swap within one group");
        let a = self.groups[delta.group1][delta.member1];
        let b = self.groups[delta.group2][delta.member2];
        self.groups[delta.group1][delta.member1] = b;
        self.groups[delta.group2][delta.member2] = a;
    }

    /// Number of cross-group swap pairs, counting each pair once from each
    /// side: `Σ_i (n - |group_i|)`.
    pub fn num_swap_pairs(&self) -> usize {
        let n = self.num_people();
        self.groups.iter().map(|g| n - g.len()).sum()
    }

    /// Index of the group each person belongs to.
    pub fn group_of_each(&self) -> Vec<usize> {
        let mut owner = vec![0; self.num_people()];
        for (m, group) in self.groups.iter().enumerate() {
            for &person in group {
                owner[person] = m;
            }
        }
        owner
    }

    /// Whether every id in `0..n` appears exactly once.
    pub fn is_valid(&self) -> bool {
        let n = self.num_people();
        let mut seen = vec![false; n];
        self.groups
            .iter()
            .flatten()
            .all(|&p| p < n && !std::mem::replace(&mut seen[p], true))
    }

    /// Consumes the partition, returning its groups.
    pub fn into_groups(self) -> Vec<Vec<usize>> {
        self.groups
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (m, group) in self.groups.iter().enumerate() {
            write!(f, "Group {m} ->")?;
            for person in group {
                write!(f, " {person}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// `n / k`, or an error when `k` does not divide `n` evenly.
pub fn group_size(n: usize, k: usize) -> Result<usize> {
    if k == 0 || n == 0 || n % k != 0 {
        return Err(GroupingError::IndivisibleGroups { n, k });
    }
    Ok(n / k)
}

/// Number of unordered cross-group pairs for `k` equal groups:
/// `n (n - n/k) / 2`.
pub fn swap_pairs(n: usize, k: usize) -> usize {
    n * (n - n / k) / 2
}
