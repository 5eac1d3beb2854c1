//! LP relaxation interface and the `good_lp` adapter.

use crate::error::{GroupingError, Result};
use good_lp::solvers::microlp::microlp;
use good_lp::{variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};

/// Bounds of one continuous variable. `None` = unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VarBounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl VarBounds {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn between(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

/// `Σ coef · x[var]  (≤ | ≥ | =)  rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub terms: Vec<(usize, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(terms: Vec<(usize, f64)>, relation: Relation, rhs: f64) -> Self {
        Self { terms, relation, rhs }
    }

    /// Single-variable bound, as used for branching.
    pub fn bound(var: usize, relation: Relation, rhs: f64) -> Self {
        Self::new(vec![(var, 1.0)], relation, rhs)
    }
}

/// A maximization LP over continuous variables.
#[derive(Debug, Clone, Default)]
pub struct LpModel {
    variables: Vec<VarBounds>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<(usize, f64)>,
}

impl LpModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns its index.
    pub fn add_variable(&mut self, bounds: VarBounds) -> usize {
        self.variables.push(bounds);
        self.variables.len() - 1
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        debug_assert!(constraint.terms.iter().all(|&(v, _)| v < self.variables.len()));
        self.constraints.push(constraint);
    }

    /// Adds `coef · x[var]` to the maximized objective.
    pub fn add_objective_term(&mut self, var: usize, coef: f64) {
        self.objective.push((var, coef));
    }

    pub fn variables(&self) -> &[VarBounds] {
        &self.variables
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[(usize, f64)] {
        &self.objective
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Objective value at `values`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective.iter().map(|&(v, c)| c * values[v]).sum()
    }
}

/// Result of one relaxation.
#[derive(Debug, Clone, PartialEq)]
pub enum LpOutcome {
    Optimal { objective: f64, values: Vec<f64> },
    Infeasible,
}

/// Solves [`LpModel`] relaxations with extra per-call constraints.
///
/// Branch constraints are passed as `extra` so the model is never mutated
/// while the search walks the tree.
pub trait LpSolver {
    fn solve(&mut self, model: &LpModel, extra: &[LinearConstraint]) -> Result<LpOutcome>;
}

/// [`LpSolver`] backed by `good_lp` with the pure-Rust `microlp` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

fn expression(handles: &[Variable], terms: &[(usize, f64)]) -> Expression {
    let mut expr = Expression::with_capacity(terms.len());
    for &(var, coef) in terms {
        expr.add_mul(coef, handles[var]);
    }
    expr
}

impl LpSolver for MicroLpSolver {
    fn solve(&mut self, model: &LpModel, extra: &[LinearConstraint]) -> Result<LpOutcome> {
        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|bounds| {
                let mut def = variable();
                if let Some(lower) = bounds.lower {
                    def = def.min(lower);
                }
                if let Some(upper) = bounds.upper {
                    def = def.max(upper);
                }
                vars.add(def)
            })
            .collect();

        let mut problem = vars
            .maximise(expression(&handles, model.objective()))
            .using(microlp);
        for constraint in model.constraints().iter().chain(extra) {
            let lhs = expression(&handles, &constraint.terms);
            problem = problem.with(match constraint.relation {
                Relation::Le => lhs.leq(constraint.rhs),
                Relation::Ge => lhs.geq(constraint.rhs),
                Relation::Eq => lhs.eq(constraint.rhs),
            });
        }

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = handles.iter().map(|&v| solution.value(v)).collect();
                Ok(LpOutcome::Optimal {
                    objective: model.evaluate(&values),
                    values,
                })
            }
            Err(ResolutionError::Infeasible) => Ok(LpOutcome::Infeasible),
            Err(e) => Err(GroupingError::Lp(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_lp() {
        // max x + y  s.t.  x + 2y <= 4,  x <= 3,  x, y in [0, 10]
        let mut model = LpModel::new();
        let x = model.add_variable(VarBounds::between(0.0, 10.0));
        let y = model.add_variable(VarBounds::between(0.0, 10.0));
        model.add_objective_term(x, 1.0);
        model.add_objective_term(y, 1.0);
        model.add_constraint(LinearConstraint::new(vec![(x, 1.0), (y, 2.0)], Relation::Le, 4.0));
        model.add_constraint(LinearConstraint::bound(x, Relation::Le, 3.0));

        match MicroLpSolver::new().solve(&model, &[]).unwrap() {
            LpOutcome::Optimal { objective, values } => {
                assert!((objective - 3.5).abs() < 1e-6, "objective = {objective}");
                assert!((values[x] - 3.0).abs() < 1e-6);
                assert!((values[y] - 0.5).abs() < 1e-6);
            }
            LpOutcome::Infeasible => panic!("feasible model reported infeasible"),
        }
    }

    #[test]
    fn test_extra_constraints_and_infeasibility() {
        let mut model = LpModel::new();
        let x = model.add_variable(VarBounds::between(0.0, 1.0));
        model.add_objective_term(x, 1.0);

        let capped = [LinearConstraint::bound(x, Relation::Le, 0.0)];
        match MicroLpSolver::new().solve(&model, &capped).unwrap() {
            LpOutcome::Optimal { objective, .. } => assert!(objective.abs() < 1e-6),
            LpOutcome::Infeasible => panic!("x = 0 is feasible"),
        }

        let clash = [
            LinearConstraint::bound(x, Relation::Le, 0.0),
            LinearConstraint::bound(x, Relation::Ge, 1.0),
        ];
        assert_eq!(MicroLpSolver::new().solve(&model, &clash).unwrap(), LpOutcome::Infeasible);
        assert_eq!(model.constraints().len(), 0, "extra constraints leak into the model");
    }
}
