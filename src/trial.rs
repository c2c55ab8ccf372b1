//! Single-trial execution: spawn, rendezvous, join, collect.
//!
//! One trial runs every registered actor exactly once, each on its own
//! freshly spawned thread, against one freshly constructed state instance.
//! The threads rendezvous on a [`StartGate`] so their critical sections race
//! as tightly as possible, then report completion over a channel. The
//! harness reads the result slot only after all completions arrive — that
//! join is the sole ordering edge between the actors and the collector.
//!
//! A trial that misses its deadline is marked [`TrialResult::Hung`] and its
//! threads are abandoned, never retried: they own only their `Arc` clones of
//! the trial's state, which leak with them.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::gate::StartGate;
use crate::state::ResultSlot;
use crate::testcase::{ActorRole, StressTest};

/// What one trial produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialResult {
    /// Every actor finished; the observer's slot held `id`.
    Completed {
        /// The collected outcome id.
        id: i64,
    },
    /// An actor panicked without translating the fault into an id itself.
    ///
    /// This is a harness-level error, not an outcome: it means the test's
    /// declaration is incomplete, not that the memory model misbehaved.
    Faulted {
        /// Name of the first faulting actor.
        actor: String,
        /// The panic message.
        message: String,
    },
    /// The trial missed its deadline; its threads were abandoned.
    Hung,
}

/// Completion message sent by each actor thread.
struct ActorExit {
    actor: String,
    fault: Option<String>,
}

/// Runs one trial of `test` with the given deadline.
pub(crate) fn run_trial<S: Send + Sync + 'static>(
    test: &StressTest<S>,
    timeout: Duration,
) -> TrialResult {
    let state = Arc::new(test.fresh_state());
    let slot = Arc::new(ResultSlot::new());
    let gate = Arc::new(StartGate::new(test.actor_count()));
    let (tx, rx) = mpsc::channel::<ActorExit>();

    for actor in test.actors() {
        let state = Arc::clone(&state);
        let slot = Arc::clone(&slot);
        let gate = Arc::clone(&gate);
        let tx = tx.clone();
        let name = actor.name().to_string();
        let role = actor.role.clone();

        std::thread::spawn(move || {
            gate.wait();
            let outcome = catch_unwind(AssertUnwindSafe(|| match &role {
                ActorRole::Worker(body) => body(state.as_ref()),
                ActorRole::Observer(body) => body(state.as_ref(), slot.as_ref()),
            }));
            let fault = outcome.err().map(panic_message);
            // The receiver may already have given up on a hung trial.
            let _ = tx.send(ActorExit { actor: name, fault });
        });
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let mut fault: Option<(String, String)> = None;

    // Wait for every actor even after a fault: the remaining actors still
    // own the trial state and must finish before the slot read is ordered.
    for _ in 0..test.actor_count() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(exit) => {
                if let Some(message) = exit.fault {
                    fault.get_or_insert((exit.actor, message));
                }
            }
            Err(_) => return TrialResult::Hung,
        }
    }

    if let Some((actor, message)) = fault {
        return TrialResult::Faulted { actor, message };
    }
    TrialResult::Completed { id: slot.get() }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
