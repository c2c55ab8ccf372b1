//! Test registration: shared state, actors, and the declared outcome table.
//!
//! Tests are registered as plain values — a state factory plus closures —
//! rather than discovered by scanning annotated items. The host passes the
//! finished [`StressTest`] to [`run`](crate::runner::run).
//!
//! Exactly one actor is the *observer*: the one handed the
//! [`ResultSlot`](crate::state::ResultSlot) to record the trial's outcome
//! id. The remaining actors mutate the shared state.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::HarnessError;
use crate::outcome::OutcomeTable;
use crate::state::{ResultSlot, StateFactory};

type WorkerFn<S> = Arc<dyn Fn(&S) + Send + Sync>;
type ObserverFn<S> = Arc<dyn Fn(&S, &ResultSlot) + Send + Sync>;

/// What an actor does when its trial thread is released.
pub(crate) enum ActorRole<S> {
    /// Mutates the shared state; produces no id.
    Worker(WorkerFn<S>),
    /// Reads the shared state and records the outcome id.
    Observer(ObserverFn<S>),
}

impl<S> Clone for ActorRole<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Worker(f) => Self::Worker(Arc::clone(f)),
            Self::Observer(f) => Self::Observer(Arc::clone(f)),
        }
    }
}

/// One registered actor procedure.
pub struct Actor<S> {
    name: String,
    pub(crate) role: ActorRole<S>,
}

impl<S> Actor<S> {
    /// Returns the actor's registered name (used in fault reports).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for the designated observer.
    #[must_use]
    pub fn is_observer(&self) -> bool {
        matches!(self.role, ActorRole::Observer(_))
    }
}

impl<S> Clone for Actor<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            role: self.role.clone(),
        }
    }
}

/// A registered stress test: name, state factory, ordered actors, and the
/// declared outcome table.
///
/// Built fluently; validated by the runner before any trial executes:
///
/// ```ignore
/// let test = StressTest::new("publish", PublishState::default)
///     .actor("writer", |s: &PublishState| { /* mutate */ })
///     .observer("reader", |s, r| r.set(/* id */ 42))
///     .outcomes(table);
/// ```
pub struct StressTest<S: Send + Sync + 'static> {
    name: String,
    factory: Arc<dyn StateFactory<State = S>>,
    actors: SmallVec<[Actor<S>; 4]>,
    table: OutcomeTable,
}

impl<S: Send + Sync + 'static> StressTest<S> {
    /// Creates a test with the given name and state factory.
    pub fn new(name: impl Into<String>, factory: impl StateFactory<State = S> + 'static) -> Self {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
            actors: SmallVec::new(),
            table: OutcomeTable::default(),
        }
    }

    /// Registers a worker actor. Registration order is the dispatch order.
    #[must_use]
    pub fn actor(
        mut self,
        name: impl Into<String>,
        body: impl Fn(&S) + Send + Sync + 'static,
    ) -> Self {
        self.actors.push(Actor {
            name: name.into(),
            role: ActorRole::Worker(Arc::new(body)),
        });
        self
    }

    /// Registers the designated observer actor.
    #[must_use]
    pub fn observer(
        mut self,
        name: impl Into<String>,
        body: impl Fn(&S, &ResultSlot) + Send + Sync + 'static,
    ) -> Self {
        self.actors.push(Actor {
            name: name.into(),
            role: ActorRole::Observer(Arc::new(body)),
        });
        self
    }

    /// Attaches the declared outcome table.
    #[must_use]
    pub fn outcomes(mut self, table: OutcomeTable) -> Self {
        self.table = table;
        self
    }

    /// Returns the test name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared outcome table.
    #[must_use]
    pub fn table(&self) -> &OutcomeTable {
        &self.table
    }

    /// Returns the registered actors in dispatch order.
    #[must_use]
    pub fn actors(&self) -> &[Actor<S>] {
        &self.actors
    }

    /// Returns the number of registered actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Constructs a fresh state instance for one trial.
    pub(crate) fn fresh_state(&self) -> S {
        self.factory.create()
    }

    /// Checks the configuration invariants: at least one actor, exactly one
    /// observer.
    pub(crate) fn validate(&self) -> Result<(), HarnessError> {
        if self.actors.is_empty() {
            return Err(HarnessError::NoActors);
        }
        let observers = self.actors.iter().filter(|a| a.is_observer()).count();
        match observers {
            1 => Ok(()),
            0 => Err(HarnessError::NoObserver),
            count => Err(HarnessError::MultipleObservers { count }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeTable;

    fn two_actor_test() -> StressTest<ResultSlot> {
        StressTest::new("two-actor", ResultSlot::new)
            .actor("writer", |_s: &ResultSlot| {})
            .observer("reader", |_s, r| r.set(1))
    }

    #[test]
    fn builder_preserves_dispatch_order() {
        let test = two_actor_test();
        assert_eq!(test.actor_count(), 2);
        assert_eq!(test.actors()[0].name(), "writer");
        assert_eq!(test.actors()[1].name(), "reader");
        assert!(!test.actors()[0].is_observer());
        assert!(test.actors()[1].is_observer());
    }

    #[test]
    fn validate_accepts_single_observer() {
        assert!(two_actor_test().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_actor_list() {
        let test: StressTest<ResultSlot> = StressTest::new("empty", ResultSlot::new);
        assert_eq!(test.validate(), Err(HarnessError::NoActors));
    }

    #[test]
    fn validate_rejects_missing_observer() {
        let test = StressTest::new("workers-only", ResultSlot::new)
            .actor("a", |_s: &ResultSlot| {})
            .actor("b", |_s: &ResultSlot| {});
        assert_eq!(test.validate(), Err(HarnessError::NoObserver));
    }

    #[test]
    fn validate_rejects_second_observer() {
        let test = two_actor_test().observer("extra", |_s, r| r.set(2));
        assert_eq!(
            test.validate(),
            Err(HarnessError::MultipleObservers { count: 2 })
        );
    }

    #[test]
    fn fresh_state_allocates_per_call() {
        let test = StressTest::new("fresh", || vec![1u8, 2, 3])
            .observer("reader", |_s: &Vec<u8>, r| r.set(0));
        let a = test.fresh_state();
        let b = test.fresh_state();
        assert_ne!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn outcomes_attaches_table() {
        let table = OutcomeTable::builder()
            .acceptable(1, "done")
            .build()
            .expect("valid table");
        let test = two_actor_test().outcomes(table);
        assert_eq!(test.table().len(), 1);
    }
}
