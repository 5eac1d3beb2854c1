//! Error type shared by every module.

use thiserror::Error;

/// Errors reported to callers of the grouping engine.
///
/// Broken internal invariants (a move inside one group, an objective read
/// before initialization) are not represented here; they are
/// `debug_assert!`s and callers are trusted to uphold them in release builds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroupingError {
    #[error("{n} people cannot be split into {k} equal groups")]
    IndivisibleGroups { n: usize, k: usize },

    #[error("partition has no groups or an empty group")]
    EmptyGroup,

    #[error("person {person} is out of range for {n} people")]
    PersonOutOfRange { person: usize, n: usize },

    #[error("person {0} appears more than once")]
    DuplicatePerson(usize),

    #[error("weight matrix row {row} has {len} entries, expected {n}")]
    NonSquareWeights { row: usize, len: usize, n: usize },

    #[error("weight matrix covers {weights} people but the partition holds {partition}")]
    SizeMismatch { weights: usize, partition: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("objective `{0}` has no linear relaxation")]
    UnsupportedObjective(String),

    #[error("no integral solution exists")]
    NoIntegralSolution,

    #[error("node limit of {0} reached before any integral solution was found")]
    NodeLimit(usize),

    #[error("LP solver failed: {0}")]
    Lp(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GroupingError>;
