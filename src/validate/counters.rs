use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::network::model::NetworkModel;

/// Per-feature out-of-range tallies.
///
/// Counts only grow, until [`reset`](RangeCounters::reset) or a new value is
/// created. For parallel passes give each worker its own counters and
/// [`merge`](RangeCounters::merge) them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RangeCounters {
    counts: Vec<u64>,
}

/// One row of [`RangeCounters::report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutOfRangeReport {
    pub variable: String,
    pub min: f64,
    pub max: f64,
    pub count: u64,
}

impl RangeCounters {
    /// Zeroed counters for `num_inputs` features.
    pub fn new(num_inputs: usize) -> RangeCounters {
        RangeCounters { counts: vec![0; num_inputs] }
    }

    /// Zeroed counters sized for `model`.
    pub fn for_model(model: &NetworkModel) -> RangeCounters {
        RangeCounters::new(model.num_inputs())
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn get(&self, feature: usize) -> Option<u64> {
        self.counts.get(feature).copied()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.counts
    }

    /// Sum over all features.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    pub(crate) fn increment(&mut self, feature: usize) {
        self.counts[feature] += 1;
    }

    /// Adds `other` into `self` feature by feature.
    ///
    /// # Panics
    /// Panics if the two counters track a different number of features.
    pub fn merge(&mut self, other: &RangeCounters) {
        assert_eq!(
            self.counts.len(),
            other.counts.len(),
            "cannot merge counters for different feature counts"
        );
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
    }

    /// Non-zero counters with the variable name and range they refer to.
    /// Undeclared variables are named `input[<i>]`.
    pub fn report(&self, model: &NetworkModel) -> Vec<OutOfRangeReport> {
        self.counts
            .iter()
            .zip(model.input_range())
            .enumerate()
            .filter(|&(_, (&count, _))| count > 0)
            .map(|(i, (&count, range))| OutOfRangeReport {
                variable: model
                    .input_variables()
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("input[{i}]")),
                min: range.min,
                max: range.max,
                count,
            })
            .collect()
    }
}

impl AddAssign<&RangeCounters> for RangeCounters {
    fn add_assign(&mut self, rhs: &RangeCounters) {
        self.merge(rhs);
    }
}
