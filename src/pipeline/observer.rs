//! Attack observers.
//!
//! An [`AttackObserver`] is notified when an attack starts, after every
//! search iteration, and when the attack reaches its terminal outcome.
//! Observers are the only hook that runs between iterations; the default
//! [`NoopObserver`] compiles away.

use std::time::{Duration, Instant};

use crate::types::{AttackInput, AttackResult};

/// What happened in one search iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    /// Zero-based iteration counter
    pub iteration: usize,
    /// Candidates proposed by the transformation
    pub generated: usize,
    /// Candidates that passed every constraint
    pub accepted: usize,
    /// Fitness of the best accepted candidate, if any
    pub best_fitness: Option<f64>,
    /// Position committed in this iteration, if any
    pub committed: Option<usize>,
    /// Wall time spent in this iteration
    pub elapsed: Duration,
}

/// Measures the wall time of one iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationClock {
    started: Instant,
}

impl IterationClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Callbacks fired during an attack. Every method defaults to a no-op.
pub trait AttackObserver {
    fn on_attack_start(&mut self, _input: &AttackInput) {}

    fn on_iteration(&mut self, _report: &IterationReport) {}

    fn on_attack_end(&mut self, _result: &AttackResult) {}
}

impl<O: AttackObserver + ?Sized> AttackObserver for &mut O {
    fn on_attack_start(&mut self, input: &AttackInput) {
        (**self).on_attack_start(input)
    }

    fn on_iteration(&mut self, report: &IterationReport) {
        (**self).on_iteration(report)
    }

    fn on_attack_end(&mut self, result: &AttackResult) {
        (**self).on_attack_end(result)
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AttackObserver for NoopObserver {}

/// Collects iteration reports and terminal results, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub started: usize,
    pub iterations: Vec<IterationReport>,
    pub results: Vec<AttackResult>,
}

impl AttackObserver for RecordingObserver {
    fn on_attack_start(&mut self, _input: &AttackInput) {
        self.started += 1;
    }

    fn on_iteration(&mut self, report: &IterationReport) {
        self.iterations.push(report.clone());
    }

    fn on_attack_end(&mut self, result: &AttackResult) {
        self.results.push(result.clone());
    }
}
