//! Trial-scoped state construction and the observer's result slot.
//!
//! Every trial gets a *freshly allocated* state instance. Reusing or
//! resetting a shared instance would couple trials through the very
//! visibility effects the harness exists to measure, so the factory contract
//! is allocation, not reset.

use std::sync::atomic::{AtomicI64, Ordering};

/// Factory for per-trial shared state.
///
/// `create` is invoked exactly once per trial and must have no side effects
/// outside the returned value. Any `Fn() -> S` closure works via the blanket
/// impl:
///
/// ```ignore
/// let test = StressTest::new("probe", || PublishState::default());
/// ```
pub trait StateFactory: Send + Sync {
    /// The shared mutable state type one trial's actors race over.
    type State: Send + Sync + 'static;

    /// Constructs a fresh state instance for one trial.
    fn create(&self) -> Self::State;
}

impl<F, S> StateFactory for F
where
    F: Fn() -> S + Send + Sync,
    S: Send + Sync + 'static,
{
    type State = S;

    fn create(&self) -> S {
        self()
    }
}

/// The result cell a trial's designated observer writes its outcome id into.
///
/// Reads and writes are relaxed on purpose: the only ordering edge between
/// the observer's write and the harness's final read is the trial join
/// itself. Adding stronger orderings here would introduce synchronization
/// the actors under test never asked for.
///
/// A slot the observer never writes reads as `0`.
#[derive(Debug, Default)]
pub struct ResultSlot {
    value: AtomicI64,
}

impl ResultSlot {
    /// Creates a slot holding the default id `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the outcome id for this trial.
    pub fn set(&self, id: i64) {
        self.value.store(id, Ordering::Relaxed);
    }

    /// Reads the outcome id. Called by the harness after all actors joined.
    #[must_use]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn closure_factory_creates_fresh_values() {
        let built = AtomicUsize::new(0);
        let factory = || {
            built.fetch_add(1, Ordering::SeqCst);
            vec![0u8; 4]
        };

        let a = factory.create();
        let b = factory.create();
        assert_eq!(built.load(Ordering::SeqCst), 2);
        // Distinct allocations, not a shared instance.
        assert_ne!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn slot_defaults_to_zero() {
        let slot = ResultSlot::new();
        assert_eq!(slot.get(), 0);
    }

    #[test]
    fn slot_set_then_get() {
        let slot = ResultSlot::new();
        slot.set(-2);
        assert_eq!(slot.get(), -2);
        slot.set(42);
        assert_eq!(slot.get(), 42);
    }
}
