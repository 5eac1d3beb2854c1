//! Simulated annealing (SA) over swap moves.
//!
//! A single-trajectory search that accepts worsening moves with the
//! Metropolis probability `exp(−Δ / t)`, lowering `t` along a cooling
//! schedule after a repetition budget is spent at each level. The initial
//! temperature can be estimated from sampled transitions with
//! [`estimate_initial_temperature`].
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Aarts & Korst (1989), "Simulated Annealing and Boltzmann Machines"
//! - Ben-Ameur (2004), "Computing the Initial Temperature of Simulated Annealing"

mod config;
mod runner;
mod temperature;

pub use config::{CoolingSchedule, RepetitionSchedule, SaConfig, MAX_REPETITIONS};
pub use runner::SimulatedAnnealing;
pub use temperature::{estimate_initial_temperature, BenAmeurConfig, TemperatureEstimate};
