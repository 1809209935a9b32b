//! Trial records and the append-only trial history.

use std::time::Duration;

use serde::Serialize;

use super::FleetParams;

/// Result of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialOutcome {
    /// Total distance of the best plan found.
    Feasible(i64),
    /// No feasible plan exists for these parameters (as far as construction can tell).
    Infeasible,
}

impl TrialOutcome {
    /// Distance, or `None` when infeasible.
    pub fn distance(&self) -> Option<i64> {
        match *self {
            TrialOutcome::Feasible(d) => Some(d),
            TrialOutcome::Infeasible => None,
        }
    }
}

/// Immutable record of one evaluated configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    number: usize,
    params: FleetParams,
    outcome: TrialOutcome,
    elapsed: Duration,
}

impl TrialRecord {
    /// Creates a record; [`TrialHistory::push`] numbers them for you.
    pub fn new(number: usize, params: FleetParams, outcome: TrialOutcome, elapsed: Duration) -> Self {
        Self {
            number,
            params,
            outcome,
            elapsed,
        }
    }

    /// Zero-based trial number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Evaluated fleet size and capacity.
    pub fn params(&self) -> FleetParams {
        self.params
    }

    /// Distance found, or infeasible.
    pub fn outcome(&self) -> TrialOutcome {
        self.outcome
    }

    /// Wall-clock time the evaluation took.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Append-only sequence of trial records.
///
/// The best record is derived on demand: lowest finite distance, earliest
/// trial on ties.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fleet::search::{FleetParams, TrialHistory, TrialOutcome};
///
/// let mut history = TrialHistory::new();
/// history.push(FleetParams::new(2, 40), TrialOutcome::Feasible(900), Duration::ZERO);
/// history.push(FleetParams::new(1, 40), TrialOutcome::Infeasible, Duration::ZERO);
/// history.push(FleetParams::new(3, 40), TrialOutcome::Feasible(900), Duration::ZERO);
///
/// let best = history.best().unwrap();
/// assert_eq!(best.number(), 0);
/// assert_eq!(history.len(), 3);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrialHistory {
    records: Vec<TrialRecord>,
}

impl TrialHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record numbered after the last one and returns it.
    pub fn push(&mut self, params: FleetParams, outcome: TrialOutcome, elapsed: Duration) -> &TrialRecord {
        let number = self.records.len();
        self.records.push(TrialRecord::new(number, params, outcome, elapsed));
        &self.records[number]
    }

    /// All records in trial order.
    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    /// Number of trials run.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` before the first trial.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lowest finite distance, earliest on ties.
    pub fn best(&self) -> Option<&TrialRecord> {
        let mut best: Option<(&TrialRecord, i64)> = None;
        for record in &self.records {
            if let Some(d) = record.outcome.distance() {
                if best.is_none_or(|(_, b)| d < b) {
                    best = Some((record, d));
                }
            }
        }
        best.map(|(r, _)| r)
    }

    /// `true` if `params` has already been evaluated.
    pub fn contains(&self, params: FleetParams) -> bool {
        self.records.iter().any(|r| r.params == params)
    }

    /// Number of feasible records.
    pub fn num_feasible(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.distance().is_some())
            .count()
    }
}
