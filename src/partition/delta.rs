//! Swap moves between two slots of different groups.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Exchange of the occupants of `(group1, member1)` and `(group2, member2)`.
///
/// Equality ignores orientation: `(a <-> b) == (b <-> a)`. A valid move
/// always names two different groups.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeighborDelta {
    pub group1: usize,
    pub member1: usize,
    pub group2: usize,
    pub member2: usize,
}

impl NeighborDelta {
    pub fn new(group1: usize, member1: usize, group2: usize, member2: usize) -> Self {
        Self {
            group1,
            member1,
            group2,
            member2,
        }
    }

    /// The same move with its two coordinates exchanged.
    pub fn reversed(&self) -> Self {
        Self::new(self.group2, self.member2, self.group1, self.member1)
    }

    fn canonical(&self) -> ((usize, usize), (usize, usize)) {
        let a = (self.group1, self.member1);
        let b = (self.group2, self.member2);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl PartialEq for NeighborDelta {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for NeighborDelta {}

impl Hash for NeighborDelta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for NeighborDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(g{}, m{}) <-> (g{}, m{})",
            self.group1, self.member1, self.group2, self.member2
        )
    }
}
