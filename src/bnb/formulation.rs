//! Integer program for equal-size grouping.
//!
//! Variables, for `n` persons in `k` groups of `g`:
//!
//! - `x[i][m]` in [0, 1]: person `i` is in group `m`
//! - `z[i][j]` free, `z[i][i] = 0`: `i` and `j` share a group
//! - `s` free (minmax only): the smallest individual co-membership score
//!
//! `z[i][j] ≤ 1 + x[i][m] − x[j][m]` for both orientations and every `m`
//! pins `z[i][j]` to `0` whenever the two persons are split, so maximizing
//! a positive weighting of `z` drives it to `1` for co-members.

use super::lp::{LinearConstraint, LpModel, Relation, VarBounds};
use crate::partition::WeightMatrix;

/// Which objective the program encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Maximize `Σ (W + 1 − w[i][j]) · z[i][j]`.
    Utilitarian,
    /// Maximize `s + Σ z[i][j]` with `s ≤ Σ_j (W − w[i][j]) · z[i][j]` for
    /// every `i`.
    MinMax,
}

/// The LP relaxation plus the variable layout needed to read it back.
#[derive(Debug, Clone)]
pub struct Formulation {
    n: usize,
    k: usize,
    encoding: Encoding,
    model: LpModel,
}

impl Formulation {
    /// Builds the relaxation. `W = max(n, max weight)` keeps every `z`
    /// coefficient positive.
    pub fn new(weights: &WeightMatrix, k: usize, encoding: Encoding) -> Self {
        let n = weights.len();
        let g = n / k;
        let big_w = (n as i64).max(weights.max_weight()) as f64;
        let mut model = LpModel::new();

        for _ in 0..n * k {
            model.add_variable(VarBounds::between(0.0, 1.0));
        }
        for i in 0..n {
            for j in 0..n {
                model.add_variable(if i == j {
                    VarBounds::between(0.0, 0.0)
                } else {
                    VarBounds::free()
                });
            }
        }

        let mut layout = Self {
            n,
            k,
            encoding,
            model: LpModel::new(),
        };

        // One group per person.
        for i in 0..n {
            let terms = (0..k).map(|m| (layout.x(i, m), 1.0)).collect();
            model.add_constraint(LinearConstraint::new(terms, Relation::Eq, 1.0));
        }
        // g persons per group.
        for m in 0..k {
            let terms = (0..n).map(|i| (layout.x(i, m), 1.0)).collect();
            model.add_constraint(LinearConstraint::new(terms, Relation::Eq, g as f64));
        }
        // z[i][j] − x[i][m] + x[j][m] ≤ 1 and z[i][j] + x[i][m] − x[j][m] ≤ 1.
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let z = layout.z(i, j);
                for m in 0..k {
                    let (xi, xj) = (layout.x(i, m), layout.x(j, m));
                    model.add_constraint(LinearConstraint::new(
                        vec![(z, 1.0), (xi, -1.0), (xj, 1.0)],
                        Relation::Le,
                        1.0,
                    ));
                    model.add_constraint(LinearConstraint::new(
                        vec![(z, 1.0), (xi, 1.0), (xj, -1.0)],
                        Relation::Le,
                        1.0,
                    ));
                }
            }
        }

        match encoding {
            Encoding::Utilitarian => {
                for i in 0..n {
                    for j in (0..n).filter(|&j| j != i) {
                        let coef = big_w + 1.0 - weights.get(i, j) as f64;
                        model.add_objective_term(layout.z(i, j), coef);
                    }
                }
            }
            Encoding::MinMax => {
                let s = model.add_variable(VarBounds::free());
                debug_assert_eq!(s, layout.s());
                for i in 0..n {
                    // s − Σ_j (W − w[i][j]) z[i][j] ≤ 0
                    let mut terms = vec![(s, 1.0)];
                    terms.extend(
                        (0..n)
                            .filter(|&j| j != i)
                            .map(|j| (layout.z(i, j), -(big_w - weights.get(i, j) as f64))),
                    );
                    model.add_constraint(LinearConstraint::new(terms, Relation::Le, 0.0));
                }
                model.add_objective_term(s, 1.0);
                for i in 0..n {
                    for j in (0..n).filter(|&j| j != i) {
                        model.add_objective_term(layout.z(i, j), 1.0);
                    }
                }
            }
        }

        layout.model = model;
        layout
    }

    pub fn model(&self) -> &LpModel {
        &self.model
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn num_people(&self) -> usize {
        self.n
    }

    pub fn num_groups(&self) -> usize {
        self.k
    }

    /// Index of `x[i][m]`.
    pub fn x(&self, i: usize, m: usize) -> usize {
        m + i * self.k
    }

    /// Index of `z[i][j]`.
    pub fn z(&self, i: usize, j: usize) -> usize {
        self.n * self.k + i * self.n + j
    }

    /// Index of `s`.
    pub fn s(&self) -> usize {
        self.n * self.k + self.n * self.n
    }

    /// Number of `x` variables; these come first and are the only ones
    /// branched on.
    pub fn num_assignment_vars(&self) -> usize {
        self.n * self.k
    }

    /// Reads groups out of integral `values`, members in ascending order.
    pub fn groups(&self, values: &[f64]) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::with_capacity(self.n / self.k); self.k];
        for i in 0..self.n {
            if let Some(m) = (0..self.k).find(|&m| values[self.x(i, m)] > 0.5) {
                groups[m].push(i);
            }
        }
        groups
    }
}
