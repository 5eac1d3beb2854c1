//! Exact branch-and-bound over an LP relaxation.
//!
//! The grouping problem is written as a mixed integer program (see
//! [`Formulation`]) whose relaxation is solved by an [`LpSolver`]. The
//! search is depth-first over the assignment variables: each node carries
//! the branch constraints on its path, the child with the higher bound is
//! explored first, and a node is pruned once its bound cannot beat the
//! incumbent by a whole unit.
//!
//! Only the utilitarian and minmax objectives have a linear encoding.
//!
//! # References
//!
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete
//!   Programming Problems"
//! - Wolsey (1998), "Integer Programming", ch. 7

mod config;
mod formulation;
mod lp;
mod solver;

pub use config::{BnbConfig, BnbResult, BnbStatistics};
pub use formulation::{Encoding, Formulation};
pub use lp::{LinearConstraint, LpModel, LpOutcome, LpSolver, MicroLpSolver, Relation, VarBounds};
pub use solver::{solve, BranchAndBound};
