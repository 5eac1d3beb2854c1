//! Equal-size group partitioning.
//!
//! Splits `n` people into `k` groups of `n / k` so that members rank their
//! group mates as favorably as possible, given a matrix of pairwise
//! preference ranks (lower is better). Provides:
//!
//! - **Partitions and moves**: validated [`partition::Partition`]s, swap
//!   moves ([`partition::NeighborDelta`]) and group bitsets.
//! - **Objectives**: utilitarian (sum of ranks), minmax (worst individual)
//!   and their convex mix, all maintained incrementally under swaps.
//! - **Neighbor generators**: exhaustive lexical enumeration and capped
//!   random sampling.
//! - **Local search**: simple, steepest-ascent, first-choice, stochastic
//!   and random-restart hill climbing, plus simulated annealing with
//!   Ben-Ameur initial temperature estimation.
//! - **Exact search**: LP-based branch-and-bound for the utilitarian and
//!   minmax objectives.
//!
//! Every search is seeded through an explicit [`search::SearchContext`];
//! nothing holds global state, and runs with the same seed are
//! reproducible.
//!
//! # Examples
//!
//! ```
//! use u_grouping::climb::SteepestAscentHillClimber;
//! use u_grouping::objective::ObjectiveKind;
//! use u_grouping::partition::{Partition, WeightMatrix};
//! use u_grouping::search::{SearchBudget, SearchContext, SearchRunner};
//! use u_numflow::random::create_rng;
//!
//! let mut rng = create_rng(42);
//! let weights = WeightMatrix::random(12, &mut rng);
//! let mut partition = Partition::random(12, 3, &mut rng).unwrap();
//! let mut objective = ObjectiveKind::MinMax.build().unwrap();
//!
//! let mut ctx = SearchContext::new(&mut partition, &weights, objective.as_mut(), rng).unwrap();
//! let result = SearchRunner::run(&mut SteepestAscentHillClimber::new(), &mut ctx, &SearchBudget::default());
//! assert!(result.value <= 12.0 * 3.0);
//! ```

pub mod bnb;
pub mod climb;
pub mod error;
pub mod neighbor;
pub mod numeric;
pub mod objective;
pub mod partition;
pub mod sa;
pub mod search;
pub mod stop;

pub use error::{GroupingError, Result};
