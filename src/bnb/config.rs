//! Branch-and-bound configuration, result and statistics.

use crate::error::{GroupingError, Result};
use crate::partition::Partition;
use std::fmt;
use std::time::Duration;

/// Configuration for [`super::BranchAndBound`].
///
/// # Examples
///
/// ```
/// use u_grouping::bnb::BnbConfig;
///
/// let config = BnbConfig::default().with_max_nodes(10_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbConfig {
    /// Distance from the nearest integer under which an assignment
    /// variable counts as integral.
    pub integrality_tolerance: f64,

    /// Nodes to explore before giving up. `None` = unlimited.
    pub max_nodes: Option<usize>,
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self {
            integrality_tolerance: 1e-8,
            max_nodes: None,
        }
    }
}

impl BnbConfig {
    pub fn with_integrality_tolerance(mut self, tolerance: f64) -> Self {
        self.integrality_tolerance = tolerance;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.integrality_tolerance > 0.0 && self.integrality_tolerance < 0.5) {
            return Err(GroupingError::InvalidConfig(format!(
                "integrality_tolerance must be in (0, 0.5), got {}",
                self.integrality_tolerance
            )));
        }
        if self.max_nodes == Some(0) {
            return Err(GroupingError::InvalidConfig(
                "max_nodes must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Counters collected during one solve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbStatistics {
    /// Nodes popped from the stack.
    pub nodes_explored: usize,
    /// LP relaxations solved, including the final re-solve.
    pub lp_solves: usize,
    /// Nodes discarded because their bound could not beat the incumbent.
    pub prunings_bound: usize,
    /// Children discarded because their relaxation was infeasible.
    pub prunings_infeasible: usize,
    /// Times the incumbent improved.
    pub incumbents: usize,
    /// Deepest branch explored.
    pub max_depth: usize,
    pub elapsed: Duration,
}

impl fmt::Display for BnbStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Branch-and-bound statistics:")?;
        writeln!(f, "  Nodes explored:        {}", self.nodes_explored)?;
        writeln!(f, "  LP solves:             {}", self.lp_solves)?;
        writeln!(f, "  Prunings (bound):      {}", self.prunings_bound)?;
        writeln!(f, "  Prunings (infeasible): {}", self.prunings_infeasible)?;
        writeln!(f, "  Incumbents:            {}", self.incumbents)?;
        writeln!(f, "  Max depth:             {}", self.max_depth)?;
        writeln!(f, "  Total time:            {:.2?}", self.elapsed)?;
        Ok(())
    }
}

/// Outcome of [`super::BranchAndBound::solve`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbResult {
    pub partition: Partition,

    /// Rounded optimum of the maximized relaxation objective.
    pub lp_objective: i64,

    /// Value of `partition` under the requested objective (minimized).
    pub value: f64,

    /// `false` when the node limit cut the search short.
    pub proven_optimal: bool,

    pub stats: BnbStatistics,
}
