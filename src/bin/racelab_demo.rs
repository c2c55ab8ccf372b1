//! Demo probe: publication with and without release/acquire ordering.
//!
//! Runs two variants of the same two-actor race. The writer stores a value
//! and then raises a ready flag; the observer reads the flag and then the
//! value. With release/acquire ordering on the flag, an observer that sees
//! the flag must see the value — reading `0` past a raised flag is
//! forbidden. With relaxed ordering that stale read is legal, merely
//! interesting, and on weakly ordered hardware it actually shows up.
//!
//! Usage: `racelab_demo [trials]` (default 20000).

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use racelab::{run, HarnessError, OutcomeTable, RunConfig, StressTest, Verdict};

struct PublishState {
    ready: AtomicBool,
    value: AtomicI64,
}

impl PublishState {
    fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            value: AtomicI64::new(0),
        }
    }
}

fn ordered_publish(trials: u64) -> Result<Verdict, HarnessError> {
    let table = OutcomeTable::builder()
        .acceptable(-1, "observer ran before the flag was raised")
        .forbidden(0, "flag visible but value stale")
        .acceptable(42, "publication fully visible")
        .build()?;

    let test = StressTest::new("ordered-publish", PublishState::new)
        .actor("writer", |s: &PublishState| {
            s.value.store(42, Ordering::Relaxed);
            s.ready.store(true, Ordering::Release);
        })
        .observer("reader", |s, r| {
            if s.ready.load(Ordering::Acquire) {
                r.set(s.value.load(Ordering::Relaxed));
            } else {
                r.set(-1);
            }
        })
        .outcomes(table);

    run(&test, &config(trials))
}

fn relaxed_publish(trials: u64) -> Result<Verdict, HarnessError> {
    let table = OutcomeTable::builder()
        .acceptable(-1, "observer ran before the flag was raised")
        .interesting(0, "flag visible but value stale: reordering observed")
        .acceptable(42, "publication fully visible")
        .build()?;

    let test = StressTest::new("relaxed-publish", PublishState::new)
        .actor("writer", |s: &PublishState| {
            s.value.store(42, Ordering::Relaxed);
            s.ready.store(true, Ordering::Relaxed);
        })
        .observer("reader", |s, r| {
            if s.ready.load(Ordering::Relaxed) {
                r.set(s.value.load(Ordering::Relaxed));
            } else {
                r.set(-1);
            }
        })
        .outcomes(table);

    run(&test, &config(trials))
}

fn config(trials: u64) -> RunConfig {
    RunConfig::new(trials).trial_timeout(Duration::from_secs(1))
}

fn main() -> ExitCode {
    let trials = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(20_000);

    let (ordered, relaxed) = match (ordered_publish(trials), relaxed_publish(trials)) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(err), _) | (_, Err(err)) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("{ordered}\n");
    println!("{relaxed}");

    if ordered.passed && relaxed.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
