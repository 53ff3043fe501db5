use std::fmt;
use std::sync::Arc;

use crate::assembly::reduce::{nanmax, nanmedian};
use crate::assembly::{AssemblyError, DataAssembly, Label, Selector};
use crate::score::policy::RawPolicy;

/// Named reduction function for [`Operation::Reduce`].
#[derive(Clone)]
pub struct Reducer {
    name: String,
    func: Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>,
}

impl Reducer {
    pub fn new(name: impl Into<String>, func: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn max() -> Self {
        Self::new("max", nanmax)
    }

    pub fn median() -> Self {
        Self::new("median", nanmedian)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, values: &[f64]) -> f64 {
        (self.func)(values)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer").field("name", &self.name).finish()
    }
}

/// A structural operation a [`Score`](crate::score::Score) forwards to its
/// primary value and, depending on the policy, to its raw companions.
///
/// Dimension lists on aggregations follow the engine convention: empty means
/// every dimension.
#[derive(Debug, Clone)]
pub enum Operation {
    Sel(Vec<(String, Selector<Label>)>),
    Isel(Vec<(String, Selector<usize>)>),
    Squeeze(Vec<String>),
    ExpandDims { dim: String, label: Option<Label> },
    Mean(Vec<String>),
    Sum(Vec<String>),
    Std(Vec<String>),
    Min(Vec<String>),
    Reduce { reducer: Reducer, dims: Vec<String> },
}

impl Operation {
    pub fn sel(selectors: &[(&str, Selector<Label>)]) -> Self {
        Operation::Sel(
            selectors
                .iter()
                .map(|(d, s)| (d.to_string(), s.clone()))
                .collect(),
        )
    }

    pub fn isel(selectors: &[(&str, Selector<usize>)]) -> Self {
        Operation::Isel(
            selectors
                .iter()
                .map(|(d, s)| (d.to_string(), s.clone()))
                .collect(),
        )
    }

    pub fn squeeze(dims: &[&str]) -> Self {
        Operation::Squeeze(owned(dims))
    }

    pub fn expand_dims(dim: &str, label: Option<Label>) -> Self {
        Operation::ExpandDims {
            dim: dim.to_string(),
            label,
        }
    }

    pub fn mean(dims: &[&str]) -> Self {
        Operation::Mean(owned(dims))
    }

    pub fn sum(dims: &[&str]) -> Self {
        Operation::Sum(owned(dims))
    }

    pub fn std(dims: &[&str]) -> Self {
        Operation::Std(owned(dims))
    }

    pub fn min(dims: &[&str]) -> Self {
        Operation::Min(owned(dims))
    }

    pub fn reduce(reducer: Reducer, dims: &[&str]) -> Self {
        Operation::Reduce {
            reducer,
            dims: owned(dims),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Sel(_) => "sel",
            Operation::Isel(_) => "isel",
            Operation::Squeeze(_) => "squeeze",
            Operation::ExpandDims { .. } => "expand_dims",
            Operation::Mean(_) => "mean",
            Operation::Sum(_) => "sum",
            Operation::Std(_) => "std",
            Operation::Min(_) => "min",
            Operation::Reduce { .. } => "reduce",
        }
    }

    pub fn is_aggregation(&self) -> bool {
        matches!(
            self,
            Operation::Mean(_)
                | Operation::Sum(_)
                | Operation::Std(_)
                | Operation::Min(_)
                | Operation::Reduce { .. }
        )
    }

    /// Raw data rarely has the aggregate's shape, so aggregations leave
    /// companions alone unless asked.
    pub fn default_policy(&self) -> RawPolicy {
        if self.is_aggregation() {
            RawPolicy::skipping()
        } else {
            RawPolicy::applying()
        }
    }

    pub fn run(&self, assembly: &DataAssembly) -> Result<DataAssembly, AssemblyError> {
        match self {
            Operation::Sel(selectors) => {
                let selectors: Vec<(&str, Selector<Label>)> = selectors
                    .iter()
                    .map(|(d, s)| (d.as_str(), s.clone()))
                    .collect();
                assembly.sel(&selectors)
            }
            Operation::Isel(selectors) => {
                let selectors: Vec<(&str, Selector<usize>)> = selectors
                    .iter()
                    .map(|(d, s)| (d.as_str(), s.clone()))
                    .collect();
                assembly.isel(&selectors)
            }
            Operation::Squeeze(dims) => assembly.squeeze(&borrowed(dims)),
            Operation::ExpandDims { dim, label } => assembly.expand_dims(dim, label.clone()),
            Operation::Mean(dims) => assembly.mean(&borrowed(dims)),
            Operation::Sum(dims) => assembly.sum(&borrowed(dims)),
            Operation::Std(dims) => assembly.std(&borrowed(dims)),
            Operation::Min(dims) => assembly.min(&borrowed(dims)),
            Operation::Reduce { reducer, dims } => {
                assembly.reduce(&|values: &[f64]| reducer.call(values), &borrowed(dims))
            }
        }
    }
}

fn owned(dims: &[&str]) -> Vec<String> {
    dims.iter().map(|d| d.to_string()).collect()
}

fn borrowed(dims: &[String]) -> Vec<&str> {
    dims.iter().map(String::as_str).collect()
}
