use std::fmt;
use std::time::Duration;

/// Outcome of one leaf that was actually tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafOutcome {
    path: Vec<usize>,
    result: bool,
}

impl LeafOutcome {
    pub(crate) fn new(path: Vec<usize>, result: bool) -> Self {
        Self { path, result }
    }

    /// Child indices from the root down to this leaf. Empty when the root is the leaf.
    #[must_use]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    #[must_use]
    pub fn result(&self) -> bool {
        self.result
    }
}

impl fmt::Display for LeafOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(f, "/{} = {}", path.join("/"), self.result)
    }
}

/// Detailed evaluation report returned by
/// [`Condition::evaluate_detailed()`](super::condition::Condition::evaluate_detailed).
///
/// Contains the result, the leaves that were tested in execution order, how
/// many leaves short-circuiting skipped, and the wall-clock duration.
#[derive(Debug, Clone)]
#[must_use]
pub struct EvaluationReport {
    result: bool,
    tested: Vec<LeafOutcome>,
    skipped: usize,
    duration: Duration,
}

impl EvaluationReport {
    pub(crate) fn new(
        result: bool,
        tested: Vec<LeafOutcome>,
        skipped: usize,
        duration: Duration,
    ) -> Self {
        Self {
            result,
            tested,
            skipped,
            duration,
        }
    }

    /// The evaluation result, same as [`Condition::evaluate()`](super::condition::Condition::evaluate).
    #[must_use]
    pub fn result(&self) -> bool {
        self.result
    }

    /// Leaves that were tested, in execution order.
    #[must_use]
    pub fn tested(&self) -> &[LeafOutcome] {
        &self.tested
    }

    /// Number of leaves never tested because a composite short-circuited.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Wall-clock duration of the evaluation.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "result: {}", self.result)?;
        let tested: Vec<String> = self.tested.iter().map(ToString::to_string).collect();
        write!(f, ", tested: [{}]", tested.join(", "))?;
        write!(f, ", skipped: {}", self.skipped)?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
