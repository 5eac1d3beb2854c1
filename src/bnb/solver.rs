//! Depth-first branch-and-bound over the assignment variables.

use super::config::{BnbConfig, BnbResult, BnbStatistics};
use super::formulation::{Encoding, Formulation};
use super::lp::{LinearConstraint, LpOutcome, LpSolver, MicroLpSolver, Relation};
use crate::error::{GroupingError, Result};
use crate::numeric;
use crate::objective::ObjectiveKind;
use crate::partition::{group_size, Partition, WeightMatrix};
use std::time::Instant;
use tracing::{debug, info, trace};

/// Relaxation result attached to a node.
#[derive(Debug, Clone)]
enum NodeOutcome {
    Infeasible,
    Integral { bound: f64, values: Vec<f64> },
    Fractional { bound: f64, var: usize, value: f64 },
}

#[derive(Debug, Clone)]
struct Node {
    branches: Vec<LinearConstraint>,
    outcome: NodeOutcome,
}

impl Node {
    fn depth(&self) -> usize {
        self.branches.len()
    }

    fn bound(&self) -> f64 {
        match self.outcome {
            NodeOutcome::Infeasible => f64::NEG_INFINITY,
            NodeOutcome::Integral { bound, .. } | NodeOutcome::Fractional { bound, .. } => bound,
        }
    }
}

#[derive(Debug)]
struct Incumbent {
    bound: f64,
    values: Vec<f64>,
    branches: Vec<LinearConstraint>,
}

/// Exact solver for utilitarian and minmax objectives.
///
/// # Examples
///
/// ```
/// use u_grouping::bnb::{BnbConfig, BranchAndBound};
/// use u_grouping::objective::ObjectiveKind;
/// use u_grouping::partition::WeightMatrix;
///
/// let weights = WeightMatrix::new(vec![
///     vec![0, 1, 2, 3],
///     vec![1, 0, 2, 3],
///     vec![1, 2, 0, 3],
///     vec![1, 2, 3, 0],
/// ])
/// .unwrap();
/// let result = BranchAndBound::new(BnbConfig::default())
///     .solve(2, &weights, ObjectiveKind::MinMax)
///     .unwrap();
/// assert!(result.proven_optimal);
/// assert_eq!(result.value, 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct BranchAndBound<S = MicroLpSolver> {
    config: BnbConfig,
    solver: S,
}

impl BranchAndBound<MicroLpSolver> {
    pub fn new(config: BnbConfig) -> Self {
        Self::with_solver(config, MicroLpSolver::new())
    }
}

impl<S: LpSolver> BranchAndBound<S> {
    pub fn with_solver(config: BnbConfig, solver: S) -> Self {
        Self { config, solver }
    }

    pub fn config(&self) -> &BnbConfig {
        &self.config
    }

    /// Finds an optimal partition of `weights.len()` persons into `k`
    /// groups under `kind`.
    ///
    /// # Errors
    ///
    /// - [`GroupingError::UnsupportedObjective`] for mixed objectives
    /// - [`GroupingError::IndivisibleGroups`] when `k` does not divide `n`
    /// - [`GroupingError::NoIntegralSolution`] when the root is infeasible
    /// - [`GroupingError::NodeLimit`] when the node cap is hit with no
    ///   incumbent
    #[tracing::instrument(level = "debug", skip_all, fields(n = weights.len(), k = k, objective = kind.name()))]
    pub fn solve(&mut self, k: usize, weights: &WeightMatrix, kind: ObjectiveKind) -> Result<BnbResult> {
        self.config.validate()?;
        let encoding = match kind {
            ObjectiveKind::Utilitarian => Encoding::Utilitarian,
            ObjectiveKind::MinMax => Encoding::MinMax,
            ObjectiveKind::Mixed { .. } => return Err(GroupingError::UnsupportedObjective(kind.to_string())),
        };
        group_size(weights.len(), k)?;

        let start = Instant::now();
        let formulation = Formulation::new(weights, k, encoding);
        let mut stats = BnbStatistics::default();

        let root = self.evaluate(&formulation, Vec::new(), &mut stats)?;
        if matches!(root.outcome, NodeOutcome::Infeasible) {
            return Err(GroupingError::NoIntegralSolution);
        }

        let mut stack = vec![root];
        let mut incumbent: Option<Incumbent> = None;
        let mut exhausted = true;

        while let Some(node) = stack.pop() {
            if self.config.max_nodes.is_some_and(|max| stats.nodes_explored >= max) {
                exhausted = false;
                break;
            }
            stats.nodes_explored += 1;
            stats.max_depth = stats.max_depth.max(node.depth());

            if incumbent.as_ref().is_some_and(|best| !improves(node.bound(), best.bound)) {
                stats.prunings_bound += 1;
                continue;
            }

            match node.outcome {
                NodeOutcome::Infeasible => stats.prunings_infeasible += 1,
                NodeOutcome::Integral { bound, values } => {
                    trace!(bound, depth = node.branches.len(), "new incumbent");
                    stats.incumbents += 1;
                    incumbent = Some(Incumbent {
                        bound,
                        values,
                        branches: node.branches,
                    });
                }
                NodeOutcome::Fractional { var, value, .. } => {
                    let floor = self.child(&formulation, &node.branches, var, Relation::Le, value.floor(), &mut stats)?;
                    let ceil = self.child(&formulation, &node.branches, var, Relation::Ge, value.ceil(), &mut stats)?;
                    // Pushed last = explored first.
                    let (first, second) = if floor.bound() > ceil.bound() {
                        (ceil, floor)
                    } else {
                        (floor, ceil)
                    };
                    for child in [first, second] {
                        if matches!(child.outcome, NodeOutcome::Infeasible) {
                            stats.prunings_infeasible += 1;
                        } else {
                            stack.push(child);
                        }
                    }
                }
            }
        }

        let Some(best) = incumbent else {
            return Err(if exhausted {
                GroupingError::NoIntegralSolution
            } else {
                GroupingError::NodeLimit(stats.nodes_explored)
            });
        };

        let values = match self.solver.solve(formulation.model(), &best.branches)? {
            LpOutcome::Optimal { values, .. } if self.is_integral(&formulation, &values) => values,
            _ => best.values,
        };
        stats.lp_solves += 1;
        debug_assert!(co_members_linked(&formulation, &values));

        let partition = Partition::new(formulation.groups(&values))?;
        let value = kind.build()?.calculate(&partition, weights);
        stats.elapsed = start.elapsed();
        info!(
            value,
            lp_objective = best.bound.round(),
            nodes = stats.nodes_explored,
            proven_optimal = exhausted,
            elapsed = ?stats.elapsed,
            "branch-and-bound finished"
        );
        debug!("{stats}");

        Ok(BnbResult {
            partition,
            lp_objective: best.bound.round() as i64,
            value,
            proven_optimal: exhausted,
            stats,
        })
    }

    fn child(
        &mut self,
        formulation: &Formulation,
        parent: &[LinearConstraint],
        var: usize,
        relation: Relation,
        rhs: f64,
        stats: &mut BnbStatistics,
    ) -> Result<Node> {
        let mut branches = Vec::with_capacity(parent.len() + 1);
        branches.extend_from_slice(parent);
        branches.push(LinearConstraint::bound(var, relation, rhs));
        self.evaluate(formulation, branches, stats)
    }

    /// Solves the relaxation under `branches` and classifies the node by
    /// its first fractional assignment variable.
    fn evaluate(
        &mut self,
        formulation: &Formulation,
        branches: Vec<LinearConstraint>,
        stats: &mut BnbStatistics,
    ) -> Result<Node> {
        stats.lp_solves += 1;
        let outcome = match self.solver.solve(formulation.model(), &branches)? {
            LpOutcome::Infeasible => NodeOutcome::Infeasible,
            LpOutcome::Optimal { objective, values } => {
                let tolerance = self.config.integrality_tolerance;
                match (0..formulation.num_assignment_vars()).find(|&v| !numeric::is_integral(values[v], tolerance)) {
                    Some(var) => NodeOutcome::Fractional {
                        bound: objective,
                        var,
                        value: values[var],
                    },
                    None => NodeOutcome::Integral {
                        bound: objective,
                        values,
                    },
                }
            }
        };
        Ok(Node { branches, outcome })
    }

    fn is_integral(&self, formulation: &Formulation, values: &[f64]) -> bool {
        let tolerance = self.config.integrality_tolerance;
        values[..formulation.num_assignment_vars()]
            .iter()
            .all(|&v| numeric::is_integral(v, tolerance))
    }
}

/// Integer objectives: a node must promise at least one more unit.
fn improves(bound: f64, incumbent: f64) -> bool {
    bound >= incumbent + (1.0 - 1e-8)
}

fn co_members_linked(formulation: &Formulation, values: &[f64]) -> bool {
    formulation.groups(values).iter().all(|group| {
        group.iter().all(|&i| {
            group
                .iter()
                .filter(|&&j| j != i)
                .all(|&j| (values[formulation.z(i, j)] - 1.0).abs() < 1e-6)
        })
    })
}

/// [`BranchAndBound::solve`] with the default configuration and LP backend.
pub fn solve(k: usize, weights: &WeightMatrix, kind: ObjectiveKind) -> Result<BnbResult> {
    BranchAndBound::new(BnbConfig::default()).solve(k, weights, kind)
}
