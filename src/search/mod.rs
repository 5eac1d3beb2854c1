//! Local search scaffolding: context, step abstraction and runner.
//!
//! A [`SearchContext`] lends the partition, weights and objective to a
//! [`LocalSearch`] and owns the seeded RNG and group masks. The
//! [`SearchRunner`] drives a search under a [`SearchBudget`] and records
//! per-step diagnostics in a [`SearchResult`].

mod context;
mod runner;
mod types;

pub use context::SearchContext;
pub use runner::{SearchBudget, SearchResult, SearchRunner, StepRecord, Termination};
pub use types::LocalSearch;
