//! ado::history — append-only record of completed trials.
//!
//! Records are appended by the engine only, one per accepted update, and are
//! never reordered or edited. Hosts read them for persistence (CSV/database
//! export) and for post-hoc analysis.
use chrono::{DateTime, Utc};

use crate::ado::response::Response;

/// One completed trial.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialRecord {
    /// 1-based position in the session.
    pub trial: usize,
    pub design: f64,
    pub response: Response,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialHistory {
    records: Vec<TrialRecord>,
}

impl TrialHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from `(design, response)` pairs, stamped now.
    ///
    /// Used to re-analyse sessions that were persisted outside the engine.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, Response)>,
    {
        let mut history = Self::new();
        for (design, response) in pairs {
            history.push(design, response, Utc::now());
        }
        history
    }

    pub(crate) fn push(&mut self, design: f64, response: Response, timestamp: DateTime<Utc>) {
        let trial = self.records.len() + 1;
        self.records.push(TrialRecord { trial, design, response, timestamp });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrialRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TrialRecord> {
        self.records.last()
    }

    /// Presented designs in trial order.
    pub fn designs(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.design).collect()
    }

    /// Fraction of "clear" responses; `None` for an empty history.
    pub fn clear_rate(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let clear = self.records.iter().filter(|r| r.response.is_clear()).count();
        Some(clear as f64 / self.records.len() as f64)
    }

    /// `(min, max)` of presented designs; `None` for an empty history.
    pub fn design_range(&self) -> Option<(f64, f64)> {
        self.records.iter().map(|r| r.design).fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
    }
}

impl<'a> IntoIterator for &'a TrialHistory {
    type Item = &'a TrialRecord;
    type IntoIter = std::slice::Iter<'a, TrialRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
