//! End-to-end harness behavior: classification, faults, hangs, and the
//! configuration errors a run refuses to start with.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use racelab::test_logging::{TestEvent, TestLogLevel, TestLogger};
use racelab::{assert_log, run, HarnessError, OutcomeTable, RunConfig, StressTest};

fn single_id_table(id: i64) -> OutcomeTable {
    OutcomeTable::builder()
        .acceptable(id, "the declared outcome")
        .build()
        .expect("valid table")
}

/// A test whose observer always records `id`.
fn constant_test(id: i64) -> StressTest<()> {
    StressTest::new("constant", || ())
        .observer("reader", move |_s, r| r.set(id))
        .outcomes(single_id_table(id))
}

#[test]
fn histogram_accounts_for_every_scheduled_trial() {
    let test = constant_test(5);
    let verdict = run(&test, &RunConfig::new(300).workers(4)).expect("valid run");

    assert!(verdict.passed);
    assert_eq!(verdict.trials, 300);
    assert_eq!(verdict.completed + verdict.hung + verdict.faults, 300);
    assert_eq!(verdict.histogram.values().sum::<u64>(), verdict.completed);
}

#[test]
fn undeclared_id_fails_the_run() {
    let test = StressTest::new("undeclared", || ())
        .observer("reader", |_s, r| r.set(99))
        .outcomes(single_id_table(1));

    let verdict = run(&test, &RunConfig::new(20)).expect("valid run");

    assert!(!verdict.passed);
    assert_eq!(verdict.unknown_observed, vec![99]);
    assert_eq!(verdict.count_of(99), 20);
}

#[test]
fn forbidden_id_fails_the_run() {
    let table = OutcomeTable::builder()
        .acceptable(1, "fine")
        .forbidden(2, "must never happen")
        .build()
        .expect("valid table");
    let test = StressTest::new("forbidden", || ())
        .observer("reader", |_s, r| r.set(2))
        .outcomes(table);

    let verdict = run(&test, &RunConfig::new(10)).expect("valid run");

    assert!(!verdict.passed);
    assert_eq!(verdict.forbidden_observed, vec![2]);
}

#[test]
fn actor_can_translate_its_own_fault_into_an_id() {
    // The actor catches its panic and records a sentinel id instead of
    // letting the harness count a fault.
    let table = OutcomeTable::builder()
        .acceptable(-2, "observer hit an error while reading")
        .build()
        .expect("valid table");

    let test = StressTest::new("translated-fault", Vec::<i64>::new)
        .observer("reader", |s: &Vec<i64>, r| {
            let got = catch_unwind(AssertUnwindSafe(|| s[0]));
            r.set(got.unwrap_or(-2));
        })
        .outcomes(table);

    let verdict = run(&test, &RunConfig::new(50)).expect("valid run");

    assert!(verdict.passed, "unexpected verdict:\n{verdict}");
    assert_eq!(verdict.count_of(-2), 50);
    assert_eq!(verdict.faults, 0);
}

#[test]
fn untranslated_panic_is_a_fault_and_fails_the_run() {
    let test = StressTest::new("panics", || ())
        .actor("bomb", |_s: &()| panic!("boom"))
        .observer("reader", |_s, r| r.set(1))
        .outcomes(single_id_table(1));

    let verdict = run(&test, &RunConfig::new(8)).expect("valid run");

    assert!(!verdict.passed);
    assert_eq!(verdict.faults, 8);
    assert!(!verdict.fault_samples.is_empty());
    assert!(verdict.fault_samples[0].contains("bomb"));
    assert!(verdict.fault_samples[0].contains("boom"));
}

#[test]
fn hung_trials_are_abandoned_within_the_deadline() {
    let test = StressTest::new("hangs", || ())
        .actor("sleeper", |_s: &()| {
            std::thread::sleep(Duration::from_secs(5));
        })
        .observer("reader", |_s, r| r.set(1))
        .outcomes(single_id_table(1));

    let started = Instant::now();
    let verdict = run(
        &test,
        &RunConfig::new(4)
            .trial_timeout(Duration::from_millis(50))
            .workers(4),
    )
    .expect("valid run");
    let elapsed = started.elapsed();

    assert_eq!(verdict.hung, 4);
    assert_eq!(verdict.completed, 0);
    // Hangs are reported, not failed.
    assert!(verdict.passed, "unexpected verdict:\n{verdict}");
    // The run must not wait out the sleeping actors.
    assert!(elapsed < Duration::from_secs(4), "took {elapsed:?}");
}

#[test]
fn config_errors_refuse_to_start() {
    let no_actors: StressTest<()> = StressTest::new("no-actors", || ());
    assert_eq!(
        run(&no_actors, &RunConfig::new(10)).expect_err("no actors"),
        HarnessError::NoActors
    );

    let no_observer = StressTest::new("no-observer", || ()).actor("w", |_s: &()| {});
    assert_eq!(
        run(&no_observer, &RunConfig::new(10)).expect_err("no observer"),
        HarnessError::NoObserver
    );

    let two_observers = StressTest::new("two-observers", || ())
        .observer("a", |_s, r| r.set(1))
        .observer("b", |_s, r| r.set(2));
    assert_eq!(
        run(&two_observers, &RunConfig::new(10)).expect_err("two observers"),
        HarnessError::MultipleObservers { count: 2 }
    );

    assert_eq!(
        run(&constant_test(1), &RunConfig::new(0)).expect_err("zero trials"),
        HarnessError::ZeroTrials
    );
}

#[test]
fn duplicate_outcome_id_rejected_at_table_build() {
    let err = OutcomeTable::builder()
        .acceptable(3, "first")
        .forbidden(3, "again")
        .build()
        .expect_err("duplicate id");
    assert_eq!(err, HarnessError::DuplicateOutcome { id: 3 });
}

#[test]
fn empty_table_classifies_everything_unknown() {
    let test = StressTest::new("empty-table", || ()).observer("reader", |_s, r| r.set(1));

    let verdict = run(&test, &RunConfig::new(10)).expect("valid run");

    assert!(!verdict.passed);
    assert_eq!(verdict.unknown_observed, vec![1]);
}

#[test]
fn classification_is_pure_in_the_observations() {
    let test = constant_test(11);
    let config = RunConfig::new(40).workers(2);

    let first = run(&test, &config).expect("valid run");
    let second = run(&test, &config).expect("valid run");

    assert_eq!(first.passed, second.passed);
    assert_eq!(first.histogram, second.histogram);
    assert_eq!(first.forbidden_observed, second.forbidden_observed);
    assert_eq!(first.unknown_observed, second.unknown_observed);
}

#[test]
fn shared_counter_increments_are_never_lost_in_the_tally() {
    // Two workers both bump a counter; the observer reads the total. Either
    // worker may finish before or after the read, so 0, 1, and 2 bumps are
    // all legal at observation time.
    let table = OutcomeTable::builder()
        .acceptable(0, "observer ran first")
        .acceptable(1, "one increment visible")
        .acceptable(2, "both increments visible")
        .build()
        .expect("valid table");

    let test = StressTest::new("two-writers", || AtomicI64::new(0))
        .actor("writer-a", |s: &AtomicI64| {
            s.fetch_add(1, Ordering::SeqCst);
        })
        .actor("writer-b", |s: &AtomicI64| {
            s.fetch_add(1, Ordering::SeqCst);
        })
        .observer("reader", |s, r| r.set(s.load(Ordering::SeqCst)))
        .outcomes(table);

    let trials = 500;
    let verdict = run(&test, &RunConfig::new(trials).workers(4)).expect("valid run");

    assert!(verdict.passed, "unexpected verdict:\n{verdict}");
    assert_eq!(verdict.completed, trials);
    assert_eq!(
        verdict.count_of(0) + verdict.count_of(1) + verdict.count_of(2),
        trials
    );
}

#[test]
fn run_history_via_test_logger() {
    let logger = TestLogger::new(TestLogLevel::Trace);
    let test = constant_test(4);

    logger.log(TestEvent::RunStart {
        test: test.name().to_string(),
        trials: 30,
    });
    let verdict = run(&test, &RunConfig::new(30)).expect("valid run");
    let mut index = 0;
    for (&id, &count) in &verdict.histogram {
        for _ in 0..count {
            logger.log(TestEvent::TrialOutcome { index, id });
            index += 1;
        }
    }
    logger.log(TestEvent::RunComplete {
        test: test.name().to_string(),
        passed: verdict.passed,
    });

    assert_log!(logger, verdict.passed, "run failed:\n{}", verdict);
    assert_eq!(logger.event_count(), 32);
    assert!(logger.report().contains("Trial outcomes: 30"));
    logger.assert_no_errors();
}

#[test]
fn fault_and_hang_events_reach_the_logger() {
    let logger = TestLogger::new(TestLogLevel::Trace);

    let faulty = StressTest::new("panics", || ())
        .actor("bomb", |_s: &()| panic!("boom"))
        .observer("reader", |_s, r| r.set(1))
        .outcomes(single_id_table(1));
    let verdict = run(&faulty, &RunConfig::new(3)).expect("valid run");
    for (index, sample) in verdict.fault_samples.iter().enumerate() {
        let (actor, message) = sample.split_once(": ").unwrap_or(("?", sample));
        logger.log(TestEvent::ActorFault {
            index: index as u64,
            actor: actor.to_string(),
            message: message.to_string(),
        });
    }

    let sleepy = StressTest::new("hangs", || ())
        .actor("sleeper", |_s: &()| {
            std::thread::sleep(Duration::from_secs(5));
        })
        .observer("reader", |_s, r| r.set(1))
        .outcomes(single_id_table(1));
    let verdict = run(
        &sleepy,
        &RunConfig::new(2)
            .trial_timeout(Duration::from_millis(50))
            .workers(2),
    )
    .expect("valid run");
    for index in 0..verdict.hung {
        logger.log(TestEvent::TrialHung { index });
    }

    let report = logger.report();
    assert!(report.contains("Actor faults: 3"), "report:\n{report}");
    assert!(report.contains("Hung trials: 2"), "report:\n{report}");
    // Faults and hangs are warnings in the log, not errors.
    logger.assert_no_errors();
}

#[test]
fn verdict_json_round_trips_the_histogram() {
    let verdict = run(&constant_test(9), &RunConfig::new(25)).expect("valid run");
    let json = verdict.to_json();

    assert_eq!(json["test"], "constant");
    assert_eq!(json["completed"], 25);
    assert_eq!(json["histogram"][0]["id"], 9);
    assert_eq!(json["histogram"][0]["count"], 25);
    assert_eq!(json["histogram"][0]["expect"], "ACCEPTABLE");
}
