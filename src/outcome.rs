//! Outcome vocabulary: expectation categories and the declared outcome table.
//!
//! A test declares, up front, every outcome id its actors can produce and
//! what observing that id means. The table is the contract the harness
//! classifies against: ids it does not contain are *unknown* — a gap in the
//! test's own declaration, reported separately from any memory-model result.

use serde::Serialize;

use crate::error::HarnessError;

/// Expectation category for a declared outcome id.
///
/// Serializes as the canonical report label (see [`Expect::label`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Expect {
    /// A legal, uninteresting outcome.
    Acceptable,
    /// A legal outcome whose presence (or persistent absence) is worth
    /// noticing — typically the anomaly the test was written to probe.
    AcceptableInteresting,
    /// An outcome the test's contract rules out; observing it fails the run.
    Forbidden,
}

impl Expect {
    /// Returns the canonical report label for this category.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Acceptable => "ACCEPTABLE",
            Self::AcceptableInteresting => "ACCEPTABLE_INTERESTING",
            Self::Forbidden => "FORBIDDEN",
        }
    }
}

impl std::fmt::Display for Expect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One declared outcome: an id, its expectation, and a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeSpec {
    /// The outcome id an observer writes into the result slot.
    pub id: i64,
    /// What observing this id means.
    pub expect: Expect,
    /// Human-readable description for reports.
    pub desc: String,
}

/// The declared outcome table: an ordered set of [`OutcomeSpec`]s with
/// unique ids.
///
/// Declaration order is preserved for reporting. An empty table is legal at
/// the type level but useless in practice: every observation becomes an
/// unknown id and fails the run.
#[derive(Debug, Clone, Default)]
pub struct OutcomeTable {
    specs: Vec<OutcomeSpec>,
}

impl OutcomeTable {
    /// Starts building a table.
    #[must_use]
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Returns the declared specs in declaration order.
    #[must_use]
    pub fn specs(&self) -> &[OutcomeSpec] {
        &self.specs
    }

    /// Looks up the expectation for an id by exact match.
    ///
    /// Returns `None` for ids the table does not declare.
    #[must_use]
    pub fn expect_of(&self, id: i64) -> Option<Expect> {
        self.spec_of(id).map(|s| s.expect)
    }

    /// Looks up the full spec for an id by exact match.
    #[must_use]
    pub fn spec_of(&self, id: i64) -> Option<&OutcomeSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    /// Returns the number of declared outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if no outcomes are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Fluent builder for an [`OutcomeTable`].
///
/// Each method consumes `self` and returns an updated builder; `build`
/// validates id uniqueness.
#[derive(Debug, Default)]
pub struct TableBuilder {
    specs: Vec<OutcomeSpec>,
}

impl TableBuilder {
    /// Declares an outcome with an explicit expectation.
    #[must_use]
    pub fn outcome(mut self, id: i64, expect: Expect, desc: impl Into<String>) -> Self {
        self.specs.push(OutcomeSpec {
            id,
            expect,
            desc: desc.into(),
        });
        self
    }

    /// Declares an [`Expect::Acceptable`] outcome.
    #[must_use]
    pub fn acceptable(self, id: i64, desc: impl Into<String>) -> Self {
        self.outcome(id, Expect::Acceptable, desc)
    }

    /// Declares an [`Expect::AcceptableInteresting`] outcome.
    #[must_use]
    pub fn interesting(self, id: i64, desc: impl Into<String>) -> Self {
        self.outcome(id, Expect::AcceptableInteresting, desc)
    }

    /// Declares an [`Expect::Forbidden`] outcome.
    #[must_use]
    pub fn forbidden(self, id: i64, desc: impl Into<String>) -> Self {
        self.outcome(id, Expect::Forbidden, desc)
    }

    /// Validates and finalizes the table.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::DuplicateOutcome`] if any id is declared twice.
    pub fn build(self) -> Result<OutcomeTable, HarnessError> {
        let mut seen = std::collections::HashSet::with_capacity(self.specs.len());
        for spec in &self.specs {
            if !seen.insert(spec.id) {
                return Err(HarnessError::DuplicateOutcome { id: spec.id });
            }
        }
        Ok(OutcomeTable { specs: self.specs })
    }
}
