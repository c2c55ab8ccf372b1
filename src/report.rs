//! Outcome accumulation and the final verdict.
//!
//! Workers tally trial results locally and merge into one [`Tally`] at the
//! end of their run; [`Verdict::summarize`] then classifies the merged
//! histogram against the declared table. The verdict is immutable once
//! built and renders as histogram lines plus a PASS/FAIL line.

use std::collections::BTreeMap;
use std::fmt;

use crate::outcome::{Expect, OutcomeTable};

/// Outcome id → observed count, accumulated across all completed trials.
pub type Histogram = BTreeMap<i64, u64>;

/// Mutable accumulator for trial results.
///
/// One per worker, plus one merged instance; never shared between threads
/// while mutable, so increments cannot be lost.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tally {
    pub histogram: Histogram,
    pub hung: u64,
    pub faults: u64,
    pub fault_samples: Vec<String>,
}

impl Tally {
    /// Cap on retained fault messages; the count is exact regardless.
    const FAULT_SAMPLE_CAP: usize = 8;

    pub fn record(&mut self, id: i64) {
        *self.histogram.entry(id).or_insert(0) += 1;
    }

    pub fn record_hung(&mut self) {
        self.hung += 1;
    }

    pub fn record_fault(&mut self, actor: &str, message: &str) {
        self.faults += 1;
        if self.fault_samples.len() < Self::FAULT_SAMPLE_CAP {
            self.fault_samples.push(format!("{actor}: {message}"));
        }
    }

    pub fn merge(&mut self, other: Tally) {
        for (id, count) in other.histogram {
            *self.histogram.entry(id).or_insert(0) += count;
        }
        self.hung += other.hung;
        self.faults += other.faults;
        for sample in other.fault_samples {
            if self.fault_samples.len() >= Self::FAULT_SAMPLE_CAP {
                break;
            }
            self.fault_samples.push(sample);
        }
    }
}

/// Final summary of a stress run.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// Name of the test that ran.
    pub test: String,
    /// True iff no forbidden id, no unknown id, and no actor fault occurred.
    ///
    /// Hung trials are reported but do not flip this: a missed deadline is
    /// liveness evidence, not the value-correctness evidence FORBIDDEN is
    /// reserved for.
    pub passed: bool,
    /// Trials scheduled.
    pub trials: u64,
    /// Trials that produced an outcome id. Histogram counts sum to this.
    pub completed: u64,
    /// Trials abandoned at their deadline.
    pub hung: u64,
    /// Trials terminated by an untranslated actor fault.
    pub faults: u64,
    /// Up to a handful of fault messages, for diagnostics.
    pub fault_samples: Vec<String>,
    /// Declared FORBIDDEN ids that were actually observed, ascending.
    pub forbidden_observed: Vec<i64>,
    /// Observed ids absent from the declared table, ascending.
    pub unknown_observed: Vec<i64>,
    /// All observed ids and their counts.
    pub histogram: Histogram,
    table: OutcomeTable,
}

impl Verdict {
    /// Classifies a merged tally against the declared table.
    pub(crate) fn summarize(test: &str, table: &OutcomeTable, trials: u64, tally: Tally) -> Self {
        let mut forbidden_observed = Vec::new();
        let mut unknown_observed = Vec::new();

        for &id in tally.histogram.keys() {
            match table.expect_of(id) {
                Some(Expect::Forbidden) => forbidden_observed.push(id),
                Some(_) => {}
                None => unknown_observed.push(id),
            }
        }

        let completed = tally.histogram.values().sum();
        let passed =
            forbidden_observed.is_empty() && unknown_observed.is_empty() && tally.faults == 0;

        Self {
            test: test.to_string(),
            passed,
            trials,
            completed,
            hung: tally.hung,
            faults: tally.faults,
            fault_samples: tally.fault_samples,
            forbidden_observed,
            unknown_observed,
            histogram: tally.histogram,
            table: table.clone(),
        }
    }

    /// Returns the count observed for `id` (zero when never observed).
    #[must_use]
    pub fn count_of(&self, id: i64) -> u64 {
        self.histogram.get(&id).copied().unwrap_or(0)
    }

    /// Converts the verdict to JSON for artifact storage.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut lines = Vec::new();
        for spec in self.table.specs() {
            // Serialize the declared spec as-is, then attach the count.
            if let Ok(mut line) = serde_json::to_value(spec) {
                line["count"] = json!(self.count_of(spec.id));
                lines.push(line);
            }
        }
        for (&id, &count) in &self.histogram {
            if self.table.spec_of(id).is_none() {
                lines.push(json!({
                    "id": id,
                    "expect": "UNKNOWN",
                    "count": count,
                }));
            }
        }

        json!({
            "test": self.test,
            "passed": self.passed,
            "trials": self.trials,
            "completed": self.completed,
            "hung": self.hung,
            "faults": self.faults,
            "fault_samples": self.fault_samples,
            "forbidden_observed": self.forbidden_observed,
            "unknown_observed": self.unknown_observed,
            "histogram": lines,
        })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== {} ({} trials, {} completed) ===",
            self.test, self.trials, self.completed
        )?;

        // Every declared outcome, observed or not; absence of an
        // interesting id across a large run is itself a finding.
        for spec in self.table.specs() {
            writeln!(
                f,
                "{:>8}  {:<22} {:>10}  {}",
                spec.id,
                spec.expect.label(),
                self.count_of(spec.id),
                spec.desc
            )?;
        }
        for (&id, &count) in &self.histogram {
            if self.table.spec_of(id).is_none() {
                writeln!(f, "{id:>8}  {:<22} {count:>10}  (undeclared)", "UNKNOWN")?;
            }
        }

        if self.hung > 0 {
            writeln!(f, "hung trials: {}", self.hung)?;
        }
        if self.faults > 0 {
            writeln!(f, "actor faults: {}", self.faults)?;
            for sample in &self.fault_samples {
                writeln!(f, "  fault: {sample}")?;
            }
        }
        write!(f, "verdict: {}", if self.passed { "PASS" } else { "FAIL" })
    }
}
