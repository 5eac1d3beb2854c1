//! Random-restart hill climbing.

use crate::numeric::EPSILON;
use crate::objective::Objective;
use crate::partition::Partition;
use crate::search::{LocalSearch, SearchContext};
use crate::stop::{MaxSteps, StopCriterion};
use rand::Rng;
use tracing::debug;

/// Runs an inner climber to exhaustion, then reshuffles the partition and
/// climbs again, up to `max_restarts` times.
///
/// The first climb starts from the caller's partition. An optional stop
/// criterion cuts individual climbs short; it is reset at every restart.
/// The best partition seen across all climbs is kept and can be written
/// back with [`RandomRestartHillClimber::restore_best`].
#[derive(Debug)]
pub struct RandomRestartHillClimber<H> {
    inner: H,
    stop: Box<dyn StopCriterion>,
    max_restarts: usize,
    num_restarts: usize,
    finished_steps: usize,
    best_value: f64,
    best_partition: Option<Partition>,
}

impl<H: LocalSearch> RandomRestartHillClimber<H> {
    pub fn new(inner: H, max_restarts: usize) -> Self {
        Self {
            inner,
            stop: Box::new(MaxSteps::new(usize::MAX)),
            max_restarts,
            num_restarts: 0,
            finished_steps: 0,
            best_value: f64::INFINITY,
            best_partition: None,
        }
    }

    /// Criterion that ends a single climb early and triggers a restart.
    pub fn with_stop_criterion(mut self, stop: Box<dyn StopCriterion>) -> Self {
        self.stop = stop;
        self
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn num_restarts(&self) -> usize {
        self.num_restarts
    }

    /// Lowest value seen over every climb so far.
    pub fn best_value(&self) -> f64 {
        self.best_value
    }

    pub fn best_partition(&self) -> Option<&Partition> {
        self.best_partition.as_ref()
    }

    /// Writes the best partition back into the context. Returns `false` if
    /// nothing has been recorded yet.
    pub fn restore_best<O, R>(&self, ctx: &mut SearchContext<'_, O, R>) -> bool
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        match &self.best_partition {
            Some(best) => {
                ctx.restore(best);
                true
            }
            None => false,
        }
    }

    fn record_best<O, R>(&mut self, ctx: &SearchContext<'_, O, R>)
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        let value = ctx.value();
        if value + EPSILON < self.best_value {
            self.best_value = value;
            match &mut self.best_partition {
                Some(best) => best.clone_from(ctx.partition()),
                None => self.best_partition = Some(ctx.partition().clone()),
            }
        }
    }

    fn try_restart<O, R>(&mut self, ctx: &mut SearchContext<'_, O, R>) -> bool
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        if self.num_restarts >= self.max_restarts {
            return false;
        }
        self.finished_steps += self.inner.num_steps();
        self.stop.reset();
        ctx.randomize();
        self.inner.initialize(ctx);
        self.record_best(ctx);
        self.num_restarts += 1;
        debug!(
            restart = self.num_restarts,
            value = ctx.value(),
            best = self.best_value,
            "restarted from a random partition"
        );
        true
    }
}

impl<H: LocalSearch> LocalSearch for RandomRestartHillClimber<H> {
    fn name(&self) -> &'static str {
        "random-restart-hc"
    }

    fn initialize<O, R>(&mut self, ctx: &mut SearchContext<'_, O, R>)
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        self.inner.initialize(ctx);
        self.stop.reset();
        self.num_restarts = 0;
        self.finished_steps = 0;
        self.best_value = f64::INFINITY;
        self.record_best(ctx);
    }

    fn next_step<O, R>(&mut self, ctx: &mut SearchContext<'_, O, R>) -> bool
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        if !self.stop.should_stop() {
            let current = ctx.value();
            if self.inner.next_step(ctx) {
                self.stop.next_step(current, ctx.value(), true);
                self.record_best(ctx);
                return true;
            }
        }
        self.try_restart(ctx)
    }

    /// Inner steps summed over every climb, restarts excluded.
    fn num_steps(&self) -> usize {
        self.finished_steps + self.inner.num_steps()
    }

    fn num_neighbors(&self) -> usize {
        self.inner.num_neighbors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climb::testing::{instance, kinds};
    use crate::climb::{SimpleHillClimber, SteepestAscentHillClimber};
    use u_numflow::random::create_rng;

    #[test]
    fn test_restarts_up_to_bound() {
        let (mut partition, weights) = instance(12, 3, 42);
        let mut objective = crate::objective::Utilitarian::new();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(7)).unwrap();
        let mut climber = RandomRestartHillClimber::new(SimpleHillClimber::new(), 4);
        climber.initialize(&mut ctx);

        let mut restarts_seen = 0;
        while climber.next_step(&mut ctx) {
            restarts_seen = climber.num_restarts();
        }
        assert_eq!(restarts_seen, 4);
        assert_eq!(climber.num_restarts(), 4);
        assert!(climber.best_value() <= ctx.value() + 1e-9);
    }

    #[test]
    fn test_best_is_restorable() {
        for kind in kinds() {
            let (mut partition, weights) = instance(12, 4, 3);
            let mut objective = kind.build().unwrap();
            let mut ctx =
                SearchContext::new(&mut partition, &weights, objective.as_mut(), create_rng(42)).unwrap();
            let start = ctx.value();
            let mut climber = RandomRestartHillClimber::new(SteepestAscentHillClimber::new(), 3);
            climber.initialize(&mut ctx);
            while climber.next_step(&mut ctx) {}

            assert!(climber.best_value() <= start + 1e-9, "{kind}: best above start");
            assert!(climber.restore_best(&mut ctx));
            assert!(
                (ctx.value() - climber.best_value()).abs() < 1e-4,
                "{kind}: restored {} vs best {}",
                ctx.value(),
                climber.best_value()
            );
            assert!(ctx.partition().is_valid());
        }
    }

    #[test]
    fn test_stop_criterion_cuts_each_climb() {
        let (mut partition, weights) = instance(16, 4, 5);
        let mut objective = crate::objective::Utilitarian::new();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(5)).unwrap();
        let mut climber = RandomRestartHillClimber::new(SimpleHillClimber::new(), 2)
            .with_stop_criterion(Box::new(MaxSteps::new(1)));
        climber.initialize(&mut ctx);
        while climber.next_step(&mut ctx) {}

        assert_eq!(climber.num_restarts(), 2);
        assert!(climber.num_steps() <= 3, "at most one step per climb, got {}", climber.num_steps());
    }

    #[test]
    fn test_no_restarts_behaves_like_inner() {
        let (start, weights) = instance(12, 3, 8);

        let mut partition = start.clone();
        let mut objective = crate::objective::Utilitarian::new();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(1)).unwrap();
        let mut plain = SimpleHillClimber::new();
        plain.initialize(&mut ctx);
        while plain.next_step(&mut ctx) {}
        let plain_value = ctx.value();
        drop(ctx);

        let mut partition = start.clone();
        let mut objective = crate::objective::Utilitarian::new();
        let mut ctx = SearchContext::new(&mut partition, &weights, &mut objective, create_rng(1)).unwrap();
        let mut wrapped = RandomRestartHillClimber::new(SimpleHillClimber::new(), 0);
        wrapped.initialize(&mut ctx);
        while wrapped.next_step(&mut ctx) {}

        assert!((ctx.value() - plain_value).abs() < 1e-9);
        assert_eq!(wrapped.num_steps(), plain.num_steps());
    }
}
