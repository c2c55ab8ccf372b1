//! Trial scheduler: runs many independent trials across a worker pool.
//!
//! Trials share nothing but the final tally, so the scheduler parallelizes
//! them across a pool bounded by available hardware parallelism. Each
//! worker pulls trial indices from an atomic counter, keeps a private
//! [`Tally`], and merges it exactly once when it runs out of work — sharded
//! accumulation, no per-trial lock traffic.
//!
//! The pool is scoped to one `run` call: every worker thread is joined
//! before `run` returns. Only the actor threads of hung trials outlive it,
//! by design.
//!
//! A trial count is a coverage knob, not a proof: the run explores
//! interleavings probabilistically, and many short trials beat one long one
//! because visibility anomalies cluster in rare scheduling windows.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::HarnessError;
use crate::report::{Tally, Verdict};
use crate::testcase::StressTest;
use crate::trial::{run_trial, TrialResult};

/// Configuration for one stress run.
///
/// Move-based builder; each method consumes `self`:
///
/// ```ignore
/// let config = RunConfig::new(100_000)
///     .trial_timeout(Duration::from_millis(50))
///     .workers(4);
/// ```
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of independent trials to execute.
    pub trials: u64,
    /// Deadline per trial; a trial that misses it is recorded as hung and
    /// its actor threads are abandoned.
    pub trial_timeout: Duration,
    /// Worker pool size. `0` means one worker per available hardware
    /// thread; the pool never exceeds the trial count.
    pub workers: usize,
}

impl RunConfig {
    /// Creates a configuration for `trials` trials with defaults: one
    /// second per trial, pool sized to the hardware.
    #[must_use]
    pub const fn new(trials: u64) -> Self {
        Self {
            trials,
            trial_timeout: Duration::from_secs(1),
            workers: 0,
        }
    }

    /// Sets the per-trial deadline.
    #[must_use]
    pub const fn trial_timeout(mut self, timeout: Duration) -> Self {
        self.trial_timeout = timeout;
        self
    }

    /// Sets the worker pool size (`0` = hardware parallelism).
    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    fn effective_workers(&self) -> usize {
        let hardware = thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        let requested = if self.workers == 0 { hardware } else { self.workers };
        let trials = usize::try_from(self.trials).unwrap_or(usize::MAX);
        requested.min(trials).max(1)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(10_000)
    }
}

/// Runs `config.trials` independent trials of `test` and summarizes them.
///
/// # Errors
///
/// Returns a [`HarnessError`] for configuration problems (no actors,
/// missing or duplicated observer, zero trials) before any trial executes.
/// Nothing that happens during trials — forbidden outcomes, unknown ids,
/// faults, hangs — produces an `Err`; it all lands in the [`Verdict`].
pub fn run<S: Send + Sync + 'static>(
    test: &StressTest<S>,
    config: &RunConfig,
) -> Result<Verdict, HarnessError> {
    test.validate()?;
    if config.trials == 0 {
        return Err(HarnessError::ZeroTrials);
    }

    let workers = config.effective_workers();
    tracing::debug!(
        test = test.name(),
        trials = config.trials,
        workers,
        "starting stress run"
    );

    let merged = Mutex::new(Tally::default());
    let next_trial = AtomicU64::new(0);

    thread::scope(|scope| {
        for worker in 0..workers {
            let merged = &merged;
            let next_trial = &next_trial;
            scope.spawn(move || {
                let mut local = Tally::default();
                let mut executed = 0_u64;
                loop {
                    let index = next_trial.fetch_add(1, Ordering::Relaxed);
                    if index >= config.trials {
                        break;
                    }
                    match run_trial(test, config.trial_timeout) {
                        TrialResult::Completed { id } => local.record(id),
                        TrialResult::Faulted { actor, message } => {
                            tracing::debug!(trial = index, actor = %actor, fault = %message, "actor fault");
                            local.record_fault(&actor, &message);
                        }
                        TrialResult::Hung => {
                            tracing::debug!(trial = index, "trial hung, abandoning its actors");
                            local.record_hung();
                        }
                    }
                    executed += 1;
                }
                tracing::debug!(worker, trials = executed, "worker drained");
                merged.lock().merge(local);
            });
        }
    });

    let verdict = Verdict::summarize(test.name(), test.table(), config.trials, merged.into_inner());
    tracing::info!(
        test = test.name(),
        passed = verdict.passed,
        completed = verdict.completed,
        hung = verdict.hung,
        faults = verdict.faults,
        "stress run complete"
    );
    Ok(verdict)
}
