//! The annealing step.

use super::config::SaConfig;
use crate::error::Result;
use crate::neighbor::{NeighborGenerator, RandomGenerator};
use crate::numeric::{self, EPSILON};
use crate::objective::Objective;
use crate::search::{LocalSearch, SearchContext};
use crate::stop::StopCriterion;
use rand::Rng;
use tracing::{debug, trace};

/// Simulated annealing over swap moves.
///
/// Each call to [`LocalSearch::next_step`] samples moves at the current
/// temperature until one is accepted (returns `true` with the move applied)
/// or the repetition budget for that temperature runs out (returns `true`
/// after cooling one step, with the partition unchanged). The run ends when
/// the stop criterion fires, even partway through a temperature level, when
/// the temperature is no longer positive, or when the partition has no
/// neighbors at all.
///
/// # Examples
///
/// ```
/// use u_grouping::objective::Utilitarian;
/// use u_grouping::partition::{Partition, WeightMatrix};
/// use u_grouping::sa::{SaConfig, SimulatedAnnealing};
/// use u_grouping::search::{SearchBudget, SearchContext, SearchRunner};
/// use u_grouping::stop::StopRule;
/// use u_numflow::random::create_rng;
///
/// let mut rng = create_rng(42);
/// let weights = WeightMatrix::random(12, &mut rng);
/// let mut partition = Partition::random(12, 3, &mut rng).unwrap();
/// let mut objective = Utilitarian::new();
///
/// let config = SaConfig::calibrated(&objective, 12, 3, 30.0).with_stop(StopRule::MaxSteps(5_000));
/// let mut sa = SimulatedAnnealing::new(config).unwrap();
/// let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, rng).unwrap();
/// let result = SearchRunner::run(&mut sa, &mut ctx, &SearchBudget::default());
/// assert!(result.value > 0.0);
/// ```
#[derive(Debug)]
pub struct SimulatedAnnealing {
    config: SaConfig,
    stop: Box<dyn StopCriterion>,
    generator: RandomGenerator,
    cooling_step: usize,
    reps: usize,
    temperature: f64,
    accepted_moves: usize,
    num_steps: usize,
    num_neighbors: usize,
}

impl SimulatedAnnealing {
    /// Validates `config` and builds its stop criterion.
    pub fn new(config: SaConfig) -> Result<Self> {
        config.validate()?;
        let stop = config.stop.build();
        let temperature = config.initial_temperature;
        Ok(Self {
            config,
            stop,
            generator: RandomGenerator::unbounded(),
            cooling_step: 0,
            reps: 0,
            temperature,
            accepted_moves: 0,
            num_steps: 0,
            num_neighbors: 0,
        })
    }

    /// Replaces the stop criterion built from the config.
    pub fn with_stop_criterion(mut self, stop: Box<dyn StopCriterion>) -> Self {
        self.stop = stop;
        self
    }

    pub fn config(&self) -> &SaConfig {
        &self.config
    }

    /// Temperature levels completed so far.
    pub fn num_cooling_steps(&self) -> usize {
        self.cooling_step
    }

    /// Repetitions spent at the current temperature.
    pub fn num_reps(&self) -> usize {
        self.reps
    }

    /// Temperature of the most recent step.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn accepted_moves(&self) -> usize {
        self.accepted_moves
    }

    /// Metropolis rule: not worse within epsilon, or with probability
    /// `exp((current − next) / t)`.
    fn accept<R: Rng>(&self, current: f64, next: f64, rng: &mut R) -> bool {
        if next < current || numeric::is_close(next, current, EPSILON) {
            return true;
        }
        self.temperature > 0.0 && rng.random::<f64>() <= ((current - next) / self.temperature).exp()
    }
}

impl LocalSearch for SimulatedAnnealing {
    fn name(&self) -> &'static str {
        "simulated-annealing"
    }

    fn initialize<O, R>(&mut self, _ctx: &mut SearchContext<'_, O, R>)
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        self.stop.reset();
        self.cooling_step = 0;
        self.reps = 0;
        self.temperature = self.config.initial_temperature;
        self.accepted_moves = 0;
        self.num_steps = 0;
        self.num_neighbors = 0;
    }

    fn next_step<O, R>(&mut self, ctx: &mut SearchContext<'_, O, R>) -> bool
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        if self.stop.should_stop() {
            return false;
        }
        self.num_steps += 1;
        self.num_neighbors = 0;

        ctx.refresh_group_masks();
        let (from, to) = ctx.masks();
        self.generator.initialize(ctx.partition(), from, to);
        let current = ctx.value();

        let t0 = self.config.initial_temperature;
        self.temperature = self.config.cooling.temperature(t0, self.cooling_step);
        if self.temperature <= 0.0 {
            debug!(cooling_step = self.cooling_step, temperature = self.temperature, "frozen");
            return false;
        }
        let max_reps = self.config.repetitions.repetitions(self.temperature);

        while self.reps < max_reps {
            let Some(delta) = self.generator.next_move(ctx.rng()) else {
                if self.num_neighbors == 0 {
                    return false;
                }
                break;
            };
            self.num_neighbors += 1;
            ctx.apply_delta(&delta);
            let next = ctx.value();
            let accepted = self.accept(current, next, ctx.rng());
            self.stop.next_step(current, next, accepted);
            self.reps += 1;
            if accepted {
                self.accepted_moves += 1;
                trace!(%delta, current, next, "accepted");
                return true;
            }
            ctx.unapply_delta(&delta);
            if self.stop.should_stop() {
                return false;
            }
        }

        self.reps = 0;
        self.cooling_step += 1;
        self.stop.on_temperature_change();
        debug!(
            cooling_step = self.cooling_step,
            temperature = self.temperature,
            value = current,
            accepted = self.accepted_moves,
            "temperature lowered"
        );
        true
    }

    fn num_steps(&self) -> usize {
        self.num_steps
    }

    fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climb::testing::{instance, kinds};
    use crate::partition::{Partition, WeightMatrix};
    use crate::sa::{CoolingSchedule, RepetitionSchedule, MAX_REPETITIONS};
    use std::time::Duration;
    use crate::search::{SearchBudget, SearchRunner, Termination};
    use crate::stop::{MaxSteps, StopRule};
    use u_numflow::random::create_rng;

    #[test]
    fn test_improves_random_start() {
        for kind in kinds() {
            let (mut partition, weights) = instance(12, 3, 42);
            let mut objective = kind.build().unwrap();
            let t0 = objective.max_delta_value(12, 3) * 0.05;
            let config = SaConfig::calibrated(objective.as_ref(), 12, 3, t0).with_stop(StopRule::MaxSteps(60_000));
            let mut sa = SimulatedAnnealing::new(config).unwrap();
            let mut ctx =
                SearchContext::new(&mut partition, &weights, objective.as_mut(), create_rng(42)).unwrap();
            let start = ctx.value();

            let result = SearchRunner::run(&mut sa, &mut ctx, &SearchBudget::default());
            assert_eq!(result.termination, Termination::Exhausted);
            assert!(result.value <= start + 1e-4, "{kind}: {} > {start}", result.value);
            assert!(ctx.partition().is_valid());
            assert!(
                (ctx.value() - ctx.objective().calculate(ctx.partition(), ctx.weights())).abs() < 1e-4,
                "{kind}: incremental value drifted"
            );
        }
    }

    #[test]
    fn test_cold_annealing_never_worsens() {
        let (mut partition, weights) = instance(12, 4, 7);
        let mut objective = crate::objective::Utilitarian::new();
        let config = SaConfig::default()
            .with_initial_temperature(1e-9)
            .with_repetitions(RepetitionSchedule::Constant(50))
            .with_stop(StopRule::MaxSteps(2_000));
        let mut sa = SimulatedAnnealing::new(config).unwrap();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(1)).unwrap();
        sa.initialize(&mut ctx);

        let mut last = ctx.value();
        while sa.next_step(&mut ctx) {
            assert!(ctx.value() <= last + 1e-4, "uphill move at t = {}", sa.temperature());
            last = ctx.value();
        }
    }

    #[test]
    fn test_cooling_follows_schedule() {
        let (mut partition, weights) = instance(8, 2, 3);
        let mut objective = crate::objective::Utilitarian::new();
        let cooling = CoolingSchedule::Exponential { a: 0.5 };
        let config = SaConfig::default()
            .with_initial_temperature(10.0)
            .with_cooling(cooling)
            .with_repetitions(RepetitionSchedule::Constant(4));
        let mut sa = SimulatedAnnealing::new(config)
            .unwrap()
            .with_stop_criterion(Box::new(MaxSteps::new(usize::MAX)));
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(9)).unwrap();
        sa.initialize(&mut ctx);

        for _ in 0..40 {
            assert!(sa.next_step(&mut ctx));
            assert!(sa.num_reps() <= 4);
            let expected = cooling.temperature(10.0, sa.num_cooling_steps().saturating_sub(1));
            if sa.num_reps() == 0 && sa.num_cooling_steps() > 0 {
                assert!((sa.temperature() - expected).abs() < 1e-12);
            }
        }
        assert!(sa.num_cooling_steps() >= 40 / 5, "at most four accepted calls per level");
        assert!(sa.accepted_moves() <= 40);
    }

    #[test]
    fn test_stop_criterion_ends_run() {
        let (mut partition, weights) = instance(12, 3, 5);
        let mut objective = crate::objective::MinMax::new();
        let config = SaConfig::default().with_stop(StopRule::MaxSteps(100));
        let mut sa = SimulatedAnnealing::new(config).unwrap();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(5)).unwrap();
        sa.initialize(&mut ctx);

        let mut calls = 0;
        while sa.next_step(&mut ctx) {
            calls += 1;
        }
        assert!(calls < 1_000, "run did not stop: {calls} calls");
        assert!(!sa.next_step(&mut ctx));
    }

    /// Pairs {0, 1} and {2, 3} rank each other first; every swap is worse.
    fn strict_optimum() -> (Partition, WeightMatrix) {
        let weights = WeightMatrix::from_fn(4, |i, j| match (i, j) {
            _ if i == j => 0,
            (0, 1) | (1, 0) | (2, 3) | (3, 2) => 1,
            _ => 3,
        });
        (Partition::sequential(4, 2).unwrap(), weights)
    }

    #[test]
    fn test_linear_cooling_to_zero_ends_run() {
        let (mut partition, weights) = strict_optimum();
        let mut objective = crate::objective::Utilitarian::new();
        let config = SaConfig::default()
            .with_initial_temperature(1.0)
            .with_cooling(CoolingSchedule::Linear { a: 1.0 })
            .with_repetitions(RepetitionSchedule::Exponential { d: 1.0 })
            .with_stop(StopRule::MaxSteps(usize::MAX));
        let mut sa = SimulatedAnnealing::new(config).unwrap();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(3)).unwrap();

        let budget = SearchBudget::default().with_time_limit(Duration::from_secs(30));
        let result = SearchRunner::run(&mut sa, &mut ctx, &budget);
        assert_eq!(result.termination, Termination::Exhausted);
        assert_eq!(sa.num_cooling_steps(), 1);
        assert!(sa.temperature() <= 0.0);
        assert!(ctx.partition().is_valid());
    }

    #[test]
    fn test_stop_criterion_cuts_temperature_level() {
        let (mut partition, weights) = strict_optimum();
        let mut objective = crate::objective::Utilitarian::new();
        let config = SaConfig::default()
            .with_initial_temperature(1e-3)
            .with_repetitions(RepetitionSchedule::Exponential { d: 1.0 })
            .with_stop(StopRule::MaxSteps(500));
        let mut sa = SimulatedAnnealing::new(config).unwrap();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(3)).unwrap();
        sa.initialize(&mut ctx);

        assert!(!sa.next_step(&mut ctx), "level of {MAX_REPETITIONS} reps should be cut");
        assert_eq!(sa.num_reps(), 500);
        assert_eq!(sa.num_cooling_steps(), 0);
        assert_eq!(ctx.partition(), &Partition::sequential(4, 2).unwrap());
    }

    #[test]
    fn test_single_group_has_no_moves() {
        let mut partition = Partition::sequential(4, 1).unwrap();
        let weights = WeightMatrix::random(4, &mut create_rng(8));
        let mut objective = crate::objective::Utilitarian::new();
        let mut sa = SimulatedAnnealing::new(SaConfig::default()).unwrap();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(8)).unwrap();

        let result = SearchRunner::run(&mut sa, &mut ctx, &SearchBudget::default().with_max_steps(1_000));
        assert_eq!(result.termination, Termination::Exhausted);
        assert_eq!(sa.num_cooling_steps(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SaConfig::default().with_initial_temperature(-1.0);
        assert!(SimulatedAnnealing::new(config).is_err());
    }
}
