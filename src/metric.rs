//! The metric contract.
//!
//! A [`Metric`] is part of a benchmark and scores how similar two sets of
//! data are. Typically these are model and primate measurements, but metrics
//! do not care where the data comes from and also compare two primate
//! measurements, e.g. for ceiling estimates.

use crate::assembly::{AssemblyError, DataAssembly};
use crate::score::{Score, ScoreError};

#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    #[error("metric comparison is not implemented")]
    NotImplemented,
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("metric computation failed: {0}")]
    Computation(String),
}

pub trait Metric {
    /// Compares two assemblies on their similarity and returns a score,
    /// conventionally in `[0, 1]` with 1 meaning identical. The range is not
    /// enforced here; calibration belongs to the concrete metric.
    ///
    /// Implementors that do not override this are the bare contract and
    /// always fail with [`MetricError::NotImplemented`].
    fn compare(
        &self,
        assembly1: &DataAssembly,
        assembly2: &DataAssembly,
    ) -> Result<Score, MetricError> {
        let _ = (assembly1, assembly2);
        Err(MetricError::NotImplemented)
    }
}

impl<F> Metric for F
where
    F: Fn(&DataAssembly, &DataAssembly) -> Result<Score, MetricError>,
{
    fn compare(
        &self,
        assembly1: &DataAssembly,
        assembly2: &DataAssembly,
    ) -> Result<Score, MetricError> {
        self(assembly1, assembly2)
    }
}

/// True when every non-missing primary value lies in `[0, 1]`.
pub fn within_unit_interval(score: &Score) -> bool {
    score
        .values()
        .values()
        .iter()
        .filter(|v| !v.is_nan())
        .all(|v| (0.0..=1.0).contains(v))
}

#[cfg(test)]
#[path = "../tests/src_inline/metric/tests.rs"]
mod tests;
