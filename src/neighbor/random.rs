//! Random neighbor sampling.

use super::NeighborGenerator;
use crate::partition::{GroupMask, NeighborDelta, Partition};
use rand::Rng;

/// Draws moves uniformly at random, with replacement.
///
/// Groups are drawn from the valid "from" and "to" lists; if both draws
/// land on the same group, the index into the longer list (or the "to"
/// list on equal length) is bumped by one with wrap-around. Slots are drawn
/// uniformly within each group.
#[derive(Debug, Clone, Default)]
pub struct RandomGenerator {
    cap: Option<usize>,
    count: usize,
    sizes: Vec<usize>,
    valid_from: Vec<usize>,
    valid_to: Vec<usize>,
    initialized: bool,
}

impl RandomGenerator {
    /// Stops after `cap` moves per initialization.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap: Some(cap),
            ..Self::default()
        }
    }

    /// Never runs out of moves while a valid pair of groups exists.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    pub fn set_cap(&mut self, cap: Option<usize>) {
        self.cap = cap;
    }

    /// Moves drawn since the last initialization.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl NeighborGenerator for RandomGenerator {
    fn initialize(&mut self, partition: &Partition, from: &GroupMask, to: &GroupMask) {
        self.sizes.clear();
        self.sizes.extend(partition.groups().iter().map(Vec::len));
        from.collect_into(&mut self.valid_from);
        to.collect_into(&mut self.valid_to);
        self.count = 0;
        self.initialized = true;
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn next_move<R: Rng>(&mut self, rng: &mut R) -> Option<NeighborDelta> {
        debug_assert!(self.initialized, "random generator used before initialize");
        if self.cap.is_some_and(|cap| self.count >= cap) {
            return None;
        }
        let (len1, len2) = (self.valid_from.len(), self.valid_to.len());
        if len1 == 0 || len2 == 0 {
            return None;
        }

        let mut i1 = rng.random_range(0..len1);
        let mut i2 = rng.random_range(0..len2);
        if self.valid_from[i1] == self.valid_to[i2] {
            if len1 > len2 {
                i1 = (i1 + 1) % len1;
            } else {
                i2 = (i2 + 1) % len2;
            }
        }
        let group1 = self.valid_from[i1];
        let group2 = self.valid_to[i2];
        if group1 == group2 {
            return None;
        }

        self.count += 1;
        Some(NeighborDelta::new(
            group1,
            rng.random_range(0..self.sizes[group1]),
            group2,
            rng.random_range(0..self.sizes[group2]),
        ))
    }
}

/// Draw budget after which every one of the `m` ordered swap pairs has been
/// seen with probability at least `1 − m⁻²`: `⌈3·m·ln m⌉`.
pub fn max_gen_bound(partition: &Partition) -> usize {
    let m = partition.num_swap_pairs();
    if m < 2 {
        return 0;
    }
    let m = m as f64;
    (3.0 * m * m.ln()).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use u_numflow::random::create_rng;

    #[test]
    fn test_cap_is_respected() {
        let mut rng = create_rng(42);
        let partition = Partition::random(9, 3, &mut rng).unwrap();
        let mask = GroupMask::full(3);
        let mut generator = RandomGenerator::with_cap(10);
        generator.initialize(&partition, &mask, &mask);
        let mut drawn = 0;
        while let Some(delta) = generator.next_move(&mut rng) {
            assert_ne!(delta.group1, delta.group2);
            drawn += 1;
        }
        assert_eq!(drawn, 10);
        assert_eq!(generator.count(), 10);
    }

    #[test]
    fn test_single_shared_group_is_exhausted() {
        let mut rng = create_rng(42);
        let partition = Partition::sequential(6, 3).unwrap();
        let mask = GroupMask::from_indices(3, &[2]);
        let mut generator = RandomGenerator::unbounded();
        generator.initialize(&partition, &mask, &mask);
        assert!(generator.next_move(&mut rng).is_none());
    }

    #[test]
    fn test_restricted_to_side() {
        let mut rng = create_rng(42);
        let partition = Partition::random(12, 4, &mut rng).unwrap();
        let from = GroupMask::full(4);
        let to = GroupMask::from_indices(4, &[1, 3]);
        let mut generator = RandomGenerator::with_cap(200);
        generator.initialize(&partition, &from, &to);
        while let Some(delta) = generator.next_move(&mut rng) {
            assert!(to.contains(delta.group2), "group {} not allowed", delta.group2);
            assert_ne!(delta.group1, delta.group2);
            assert!(delta.member1 < 3 && delta.member2 < 3);
        }
    }

    #[test]
    fn test_restricted_from_side() {
        let mut rng = create_rng(11);
        let partition = Partition::random(12, 4, &mut rng).unwrap();
        let from = GroupMask::from_indices(4, &[0]);
        let to = GroupMask::full(4);
        let mut generator = RandomGenerator::with_cap(200);
        generator.initialize(&partition, &from, &to);
        let mut drawn = 0;
        while let Some(delta) = generator.next_move(&mut rng) {
            assert_eq!(delta.group1, 0);
            assert_ne!(delta.group2, 0);
            drawn += 1;
        }
        assert_eq!(drawn, 200);
    }

    #[test]
    fn test_max_gen_bound() {
        let partition = Partition::sequential(4, 2).unwrap();
        // m = 2 * (4 - 2) = 4
        assert_eq!(max_gen_bound(&partition), (12.0f64 * 4.0f64.ln()).ceil() as usize);
        assert_eq!(max_gen_bound(&Partition::sequential(3, 1).unwrap()), 0);
    }

    proptest! {
        #[test]
        fn prop_moves_are_valid(
            k in 2usize..6,
            size in 1usize..5,
            seed in any::<u64>(),
            from_bits in 1u32..32,
            to_bits in 1u32..32,
        ) {
            let mut rng = create_rng(seed);
            let partition = Partition::random(k * size, k, &mut rng).unwrap();
            let indices = |bits: u32| (0..k).filter(|i| bits & (1 << i) != 0).collect::<Vec<_>>();
            let from = GroupMask::from_indices(k, &indices(from_bits));
            let to = GroupMask::from_indices(k, &indices(to_bits));
            let mut generator = RandomGenerator::with_cap(50);
            generator.initialize(&partition, &from, &to);
            while let Some(delta) = generator.next_move(&mut rng) {
                prop_assert_ne!(delta.group1, delta.group2);
                prop_assert!(from.contains(delta.group1));
                prop_assert!(to.contains(delta.group2));
                prop_assert!(delta.member1 < size && delta.member2 < size);
            }
        }
    }
}
