//! Error types for the stress harness.
//!
//! The harness reserves `Err` returns for configuration problems that make a
//! run meaningless: a test with no actors, a missing or duplicated observer,
//! a malformed outcome table, or a zero trial count. Everything that can
//! happen *during* a run — forbidden outcomes, unknown ids, actor faults,
//! hung trials — is data in the [`Verdict`](crate::report::Verdict), because
//! trials are independent and one bad trial must never abort the others.

use core::fmt;

/// Fatal configuration error detected before any trial runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// The test declares no actor procedures.
    NoActors,
    /// The test declares no observer actor to fill the result slot.
    NoObserver,
    /// The test declares more than one observer actor.
    MultipleObservers {
        /// How many observers were registered.
        count: usize,
    },
    /// The outcome table declares the same id twice.
    DuplicateOutcome {
        /// The duplicated id.
        id: i64,
    },
    /// The run was configured with zero trials.
    ZeroTrials,
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActors => write!(f, "test declares no actors"),
            Self::NoObserver => write!(f, "test declares no observer actor"),
            Self::MultipleObservers { count } => {
                write!(f, "test declares {count} observer actors, expected exactly 1")
            }
            Self::DuplicateOutcome { id } => {
                write!(f, "outcome table declares id {id} more than once")
            }
            Self::ZeroTrials => write!(f, "trial count must be at least 1"),
        }
    }
}

impl std::error::Error for HarnessError {}
