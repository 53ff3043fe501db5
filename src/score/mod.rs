//! Scores: labeled results of metrics, benchmarks and ceilings.
//!
//! The high-level score is typically an aggregate of many smaller scores,
//! e.g. the median of neuroid correlations. To keep a record of those, a
//! [`Score`] carries named *raw companions*, themselves scores, that follow
//! the primary value through selection and squeezing and are merged along
//! with it. Companions are auxiliary: a companion that cannot follow an
//! operation is left as it was and the primary result is still returned.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::assembly::{AssemblyError, DataAssembly, ItemKey, Label, Selector};

pub mod merge;
pub mod operation;
pub mod outcome;
pub mod policy;

pub use operation::{Operation, Reducer};
pub use outcome::{RawOutcome, RawReport, SkipReason, Transformed};
pub use policy::{MergeOptions, RawPolicy};

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("{operation} on raw companion {key} failed: {source}")]
    RawSync {
        key: String,
        operation: &'static str,
        source: Box<ScoreError>,
    },
    #[error("merging raw companion {key} failed: {source}")]
    RawMerge { key: String, source: Box<ScoreError> },
    #[error("raw companion {key} is missing on merge input {index}")]
    MissingRawKey { key: String, index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    values: DataAssembly,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    attrs: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    raw: IndexMap<String, Score>,
}

impl From<DataAssembly> for Score {
    fn from(values: DataAssembly) -> Self {
        Score::new(values)
    }
}

impl Score {
    pub fn new(values: DataAssembly) -> Self {
        Self {
            values,
            attrs: IndexMap::new(),
            raw: IndexMap::new(),
        }
    }

    pub fn scalar(value: f64) -> Self {
        Self::new(DataAssembly::scalar(value))
    }

    pub fn with_raw(mut self, key: impl Into<String>, raw: impl Into<Score>) -> Self {
        self.raw.insert(key.into(), raw.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn values(&self) -> &DataAssembly {
        &self.values
    }

    pub fn into_values(self) -> DataAssembly {
        self.values
    }

    pub fn item(&self) -> Result<f64, ScoreError> {
        Ok(self.values.item()?)
    }

    pub fn attrs(&self) -> &IndexMap<String, Value> {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    pub fn insert_attr(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attrs.insert(key.into(), value.into())
    }

    pub fn raw(&self, key: &str) -> Option<&Score> {
        self.raw.get(key)
    }

    pub fn raw_companions(&self) -> &IndexMap<String, Score> {
        &self.raw
    }

    pub fn raw_keys(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }

    pub fn insert_raw(&mut self, key: impl Into<String>, raw: impl Into<Score>) -> Option<Score> {
        self.raw.insert(key.into(), raw.into())
    }

    pub fn remove_raw(&mut self, key: &str) -> Option<Score> {
        self.raw.shift_remove(key)
    }

    /// Applies `op` to the primary value, then (per `policy`) to every raw
    /// companion. Primary failures always propagate; companion failures only
    /// under a strict policy.
    ///
    /// Companions apply `op` to their own companions with
    /// [`Operation::default_policy`], so `policy` only governs this level.
    /// Failures further down are reported under `parent/child` keys.
    pub fn apply(&self, op: &Operation, policy: RawPolicy) -> Result<Transformed, ScoreError> {
        let values = op.run(&self.values)?;
        let attrs = if op.is_aggregation() {
            IndexMap::new()
        } else {
            self.attrs.clone()
        };

        let mut raw = IndexMap::with_capacity(self.raw.len());
        let mut report = RawReport::default();
        for (key, companion) in &self.raw {
            if !policy.apply_raw {
                raw.insert(key.clone(), companion.clone());
                report.record(key, RawOutcome::Skipped(SkipReason::NotRequested));
                continue;
            }
            // nested companions follow the operation's own defaults, never strict
            match companion.apply(op, op.default_policy()) {
                Ok(transformed) => {
                    raw.insert(key.clone(), transformed.score);
                    report.record(key, RawOutcome::Applied);
                    for (nested, reason) in transformed.report.failures() {
                        report.record(&format!("{key}/{nested}"), RawOutcome::failed(reason));
                    }
                }
                Err(err) if policy.strict => {
                    return Err(ScoreError::RawSync {
                        key: key.clone(),
                        operation: op.name(),
                        source: Box::new(err),
                    });
                }
                Err(err) => {
                    debug!(
                        key = %key,
                        operation = op.name(),
                        error = %err,
                        "raw companion left unchanged"
                    );
                    raw.insert(key.clone(), companion.clone());
                    report.record(key, RawOutcome::failed(err.to_string()));
                }
            }
        }

        Ok(Transformed {
            score: Score { values, attrs, raw },
            report,
        })
    }

    fn forward(&self, op: Operation) -> Result<Score, ScoreError> {
        let policy = op.default_policy();
        Ok(self.apply(&op, policy)?.score)
    }

    pub fn sel(&self, selectors: &[(&str, Selector<Label>)]) -> Result<Score, ScoreError> {
        self.forward(Operation::sel(selectors))
    }

    pub fn isel(&self, selectors: &[(&str, Selector<usize>)]) -> Result<Score, ScoreError> {
        self.forward(Operation::isel(selectors))
    }

    pub fn squeeze(&self, dims: &[&str]) -> Result<Score, ScoreError> {
        self.forward(Operation::squeeze(dims))
    }

    pub fn expand_dims(&self, dim: &str, label: Option<Label>) -> Result<Score, ScoreError> {
        self.forward(Operation::expand_dims(dim, label))
    }

    pub fn mean(&self, dims: &[&str]) -> Result<Score, ScoreError> {
        self.forward(Operation::mean(dims))
    }

    pub fn sum(&self, dims: &[&str]) -> Result<Score, ScoreError> {
        self.forward(Operation::sum(dims))
    }

    pub fn std(&self, dims: &[&str]) -> Result<Score, ScoreError> {
        self.forward(Operation::std(dims))
    }

    pub fn min(&self, dims: &[&str]) -> Result<Score, ScoreError> {
        self.forward(Operation::min(dims))
    }

    pub fn reduce(&self, reducer: Reducer, dims: &[&str]) -> Result<Score, ScoreError> {
        self.forward(Operation::reduce(reducer, dims))
    }

    /// In-place write into the primary value, replayed on every companion.
    pub fn set_item(&mut self, key: &ItemKey, value: f64) -> Result<RawReport, ScoreError> {
        self.set_item_with(key, value, true)
    }

    /// Companions lacking the key (or of an incompatible shape) are skipped
    /// with a diagnostic; only a failed primary write is an error.
    pub fn set_item_with(
        &mut self,
        key: &ItemKey,
        value: f64,
        apply_raw: bool,
    ) -> Result<RawReport, ScoreError> {
        self.values.assign(key, value)?;

        let mut report = RawReport::default();
        for (raw_key, companion) in self.raw.iter_mut() {
            if !apply_raw {
                report.record(raw_key, RawOutcome::Skipped(SkipReason::NotRequested));
                continue;
            }
            match companion.set_item_with(key, value, apply_raw) {
                Ok(_) => report.record(raw_key, RawOutcome::Applied),
                Err(err) => {
                    debug!(
                        key = %raw_key,
                        item = %key,
                        value,
                        error = %err,
                        "failed to set item on raw companion"
                    );
                    report.record(raw_key, RawOutcome::failed(err.to_string()));
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/score/tests.rs"]
mod tests;
