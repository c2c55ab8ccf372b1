//! racelab: a stress-test harness for memory visibility and atomicity.
//!
//! A test declares a shared state type, a set of actor procedures that race
//! on it, and a table of expected outcome ids. The harness runs many
//! independent trials — fresh state, fresh threads, tight rendezvous — and
//! classifies the observed id histogram against the declared table:
//!
//! - `ACCEPTABLE`: expected, uninteresting
//! - `ACCEPTABLE_INTERESTING`: legal but noteworthy (a visible reordering)
//! - `FORBIDDEN`: must never occur; one observation fails the run
//! - undeclared ids are `UNKNOWN` and also fail the run
//!
//! # Example
//!
//! ```ignore
//! use racelab::{run, OutcomeTable, RunConfig, StressTest};
//! use std::sync::atomic::{AtomicI64, Ordering};
//!
//! let table = OutcomeTable::builder()
//!     .acceptable(-1, "observer won the race")
//!     .acceptable(42, "writer won the race")
//!     .build()?;
//!
//! let test = StressTest::new("publish", || AtomicI64::new(-1))
//!     .actor("writer", |s: &AtomicI64| s.store(42, Ordering::Release))
//!     .observer("reader", |s, r| r.set(s.load(Ordering::Acquire)))
//!     .outcomes(table);
//!
//! let verdict = run(&test, &RunConfig::new(100_000))?;
//! println!("{verdict}");
//! # Ok::<(), racelab::HarnessError>(())
//! ```
//!
//! The harness finds anomalies probabilistically; it can prove their
//! presence, never their absence.

pub mod error;
pub mod gate;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod state;
pub mod test_logging;
pub mod testcase;
pub mod trial;

pub use error::HarnessError;
pub use gate::StartGate;
pub use outcome::{Expect, OutcomeSpec, OutcomeTable, TableBuilder};
pub use report::{Histogram, Verdict};
pub use runner::{run, RunConfig};
pub use state::{ResultSlot, StateFactory};
pub use testcase::{Actor, StressTest};
pub use trial::TrialResult;
