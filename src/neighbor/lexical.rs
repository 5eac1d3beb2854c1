//! Exhaustive neighbor enumeration.

use super::NeighborGenerator;
use crate::partition::{GroupMask, NeighborDelta, Partition};
use rand::Rng;
#[cfg(debug_assertions)]
use std::collections::HashSet;

/// Enumerates every valid swap once, in ascending `(group, slot)` order.
///
/// The outer cursor walks slots of "from" groups, the inner cursor slots of
/// "to" groups. A pair `(A, B)` with `B < A` is skipped when `B` is a valid
/// "from" group and `A` a valid "to" group, since the same swap was already
/// produced as `(B, A)`.
///
/// ```
/// use u_grouping::neighbor::LexicalGenerator;
/// use u_grouping::partition::{GroupMask, NeighborDelta, Partition};
///
/// let partition = Partition::new(vec![vec![0, 1], vec![2, 3]]).unwrap();
/// let mut generator = LexicalGenerator::new();
/// let mask = GroupMask::full(2);
/// generator.reset(&partition, &mask, &mask);
/// let moves: Vec<_> = generator.collect();
/// assert_eq!(moves.len(), 4);
/// assert_eq!(moves[0], NeighborDelta::new(0, 0, 1, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LexicalGenerator {
    sizes: Vec<usize>,
    valid_from: Vec<usize>,
    valid_to: Vec<usize>,
    from: GroupMask,
    to: GroupMask,
    outer: usize,
    outer_member: usize,
    inner: usize,
    inner_member: Option<usize>,
    initialized: bool,
    exhausted: bool,
    #[cfg(debug_assertions)]
    generated: HashSet<NeighborDelta>,
}

impl LexicalGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inherent form of [`NeighborGenerator::initialize`].
    pub fn reset(&mut self, partition: &Partition, from: &GroupMask, to: &GroupMask) {
        self.sizes.clear();
        self.sizes.extend(partition.groups().iter().map(Vec::len));
        self.from.clone_from(from);
        self.to.clone_from(to);
        from.collect_into(&mut self.valid_from);
        to.collect_into(&mut self.valid_to);
        self.outer = 0;
        self.outer_member = 0;
        self.inner = 0;
        self.inner_member = None;
        self.initialized = true;
        self.exhausted = self.valid_from.is_empty() || self.valid_to.is_empty();
        #[cfg(debug_assertions)]
        self.generated.clear();
    }

    fn step_inner(&mut self) -> bool {
        let Some(member) = self.inner_member else {
            self.inner_member = Some(0);
            return true;
        };
        if member + 1 < self.sizes[self.valid_to[self.inner]] {
            self.inner_member = Some(member + 1);
            true
        } else if self.inner + 1 < self.valid_to.len() {
            self.inner += 1;
            self.inner_member = Some(0);
            true
        } else {
            false
        }
    }

    fn step_outer(&mut self) -> bool {
        if self.outer_member + 1 < self.sizes[self.valid_from[self.outer]] {
            self.outer_member += 1;
            true
        } else if self.outer + 1 < self.valid_from.len() {
            self.outer += 1;
            self.outer_member = 0;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<NeighborDelta> {
        debug_assert!(self.initialized, "lexical generator used before initialize");
        if self.exhausted {
            return None;
        }
        loop {
            while self.step_inner() {
                let group1 = self.valid_from[self.outer];
                let group2 = self.valid_to[self.inner];
                if group1 == group2 {
                    continue;
                }
                if group2 < group1 && self.from.contains(group2) && self.to.contains(group1) {
                    continue;
                }
                let member2 = self.inner_member.unwrap_or(0);
                return Some(NeighborDelta::new(group1, self.outer_member, group2, member2));
            }
            if !self.step_outer() {
                self.exhausted = true;
                return None;
            }
            self.inner = 0;
            self.inner_member = None;
        }
    }
}

impl Iterator for LexicalGenerator {
    type Item = NeighborDelta;

    fn next(&mut self) -> Option<NeighborDelta> {
        let delta = self.advance()?;
        #[cfg(debug_assertions)]
        debug_assert!(self.generated.insert(delta), "move {delta} emitted twice");
        Some(delta)
    }
}

impl NeighborGenerator for LexicalGenerator {
    fn initialize(&mut self, partition: &Partition, from: &GroupMask, to: &GroupMask) {
        self.reset(partition, from, to);
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn next_move<R: Rng>(&mut self, _rng: &mut R) -> Option<NeighborDelta> {
        self.next()
    }
}
