//! Problem data: partitions, weights, swap moves and group masks.
//!
//! # Key Types
//!
//! - [`Partition`]: persons `0..n` split into ordered, fixed-size groups
//! - [`WeightMatrix`]: dense directed `n × n` weights
//! - [`NeighborDelta`]: a swap of two slots in different groups
//! - [`GroupMask`]: bitset restricting which groups a move may touch

mod delta;
mod groups;
mod mask;
mod weights;

pub use delta::NeighborDelta;
pub use groups::{group_size, swap_pairs, Partition};
pub use mask::GroupMask;
pub use weights::WeightMatrix;
