//! Labeled multi-dimensional arrays.
//!
//! A [`DataAssembly`] is a dense row-major `f64` payload with named
//! dimensions, one coordinate (a list of unique [`Label`]s) per dimension and
//! a set of scalar coordinates left behind by selection or squeezing.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod merge;
pub mod reduce;

pub use merge::merge_assemblies;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Str(String),
}

impl Label {
    /// Integers win; anything else is kept verbatim as a string label.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(v) => Label::Int(v),
            Err(_) => Label::Str(raw.to_string()),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{v}"),
            Label::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Label::Int(value as i64)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Str(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Str(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub labels: Vec<Label>,
}

impl Dimension {
    pub fn new<L: Into<Label>>(name: impl Into<String>, labels: impl IntoIterator<Item = L>) -> Self {
        Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn position(&self, label: &Label) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),
    #[error("label {label} not found on dimension {dim}")]
    UnknownLabel { dim: String, label: Label },
    #[error("index {index} out of bounds for dimension {dim} of size {len}")]
    IndexOutOfBounds {
        dim: String,
        index: usize,
        len: usize,
    },
    #[error("dimension {0} given more than once")]
    DuplicateDimension(String),
    #[error("label {label} appears more than once on dimension {dim}")]
    DuplicateLabel { dim: String, label: Label },
    #[error("dimension or coordinate {0} already exists")]
    DimensionExists(String),
    #[error("cannot squeeze dimension {dim} of size {len}")]
    NotSqueezable { dim: String, len: usize },
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("coordinate {name} is {existing}, cannot set it to {requested}")]
    CoordinateConflict {
        name: String,
        existing: Label,
        requested: Label,
    },
    #[error("coordinate {0} is missing on some merge inputs")]
    MissingCoordinate(String),
    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("conflicting values at [{location}]: {existing} vs {incoming}")]
    MergeConflict {
        location: String,
        existing: f64,
        incoming: f64,
    },
    #[error("nothing to merge")]
    EmptyMerge,
    #[error("expected a single value, found {0}")]
    NotScalar(usize),
}

/// Picks along one dimension. `One` drops the dimension and records the
/// picked label as a scalar coordinate; `Many` keeps it.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Selector<T> {
    pub fn one(value: impl Into<T>) -> Self {
        Selector::One(value.into())
    }

    pub fn many<V: Into<T>>(values: impl IntoIterator<Item = V>) -> Self {
        Selector::Many(values.into_iter().map(Into::into).collect())
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::One(v) => write!(f, "{v}"),
            Selector::Many(vs) => {
                f.write_str("[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Target cells of an indexed assignment. Dimensions that are not mentioned
/// are assigned in full.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKey {
    Labels(Vec<(String, Selector<Label>)>),
    Positions(Vec<(String, Selector<usize>)>),
}

impl ItemKey {
    pub fn label(dim: impl Into<String>, label: impl Into<Label>) -> Self {
        ItemKey::Labels(vec![(dim.into(), Selector::One(label.into()))])
    }

    pub fn position(dim: impl Into<String>, index: usize) -> Self {
        ItemKey::Positions(vec![(dim.into(), Selector::One(index))])
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Labels(sel) => write_selectors(f, sel),
            ItemKey::Positions(sel) => write_selectors(f, sel),
        }
    }
}

fn write_selectors<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    selectors: &[(String, Selector<T>)],
) -> fmt::Result {
    for (i, (dim, sel)) in selectors.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{dim}={sel}")?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum AxisPick {
    All,
    One(usize),
    Many(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AssemblyRepr", into = "AssemblyRepr")]
pub struct DataAssembly {
    dims: Vec<Dimension>,
    scalar_coords: IndexMap<String, Label>,
    values: Vec<f64>,
}

/// Wire form: NaN travels as `null`.
#[derive(Serialize, Deserialize)]
struct AssemblyRepr {
    #[serde(default)]
    dims: Vec<Dimension>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    scalar_coords: IndexMap<String, Label>,
    values: Vec<Option<f64>>,
}

impl TryFrom<AssemblyRepr> for DataAssembly {
    type Error = AssemblyError;

    fn try_from(repr: AssemblyRepr) -> Result<Self, Self::Error> {
        let values = repr
            .values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        let out = DataAssembly {
            dims: repr.dims,
            scalar_coords: repr.scalar_coords,
            values,
        };
        out.validate()?;
        Ok(out)
    }
}

impl From<DataAssembly> for AssemblyRepr {
    fn from(a: DataAssembly) -> Self {
        AssemblyRepr {
            dims: a.dims,
            scalar_coords: a.scalar_coords,
            values: a
                .values
                .into_iter()
                .map(|v| if v.is_nan() { None } else { Some(v) })
                .collect(),
        }
    }
}

impl DataAssembly {
    pub fn new(dims: Vec<Dimension>, values: Vec<f64>) -> Result<Self, AssemblyError> {
        let out = Self {
            dims,
            scalar_coords: IndexMap::new(),
            values,
        };
        out.validate()?;
        Ok(out)
    }

    /// 0-d assembly holding one value.
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: Vec::new(),
            scalar_coords: IndexMap::new(),
            values: vec![value],
        }
    }

    pub fn from_1d<L: Into<Label>>(
        dim: &str,
        labels: impl IntoIterator<Item = L>,
        values: Vec<f64>,
    ) -> Result<Self, AssemblyError> {
        Self::new(vec![Dimension::new(dim, labels)], values)
    }

    pub fn with_scalar_coord(
        mut self,
        name: impl Into<String>,
        label: impl Into<Label>,
    ) -> Result<Self, AssemblyError> {
        let name = name.into();
        if self.dimension(&name).is_some() {
            return Err(AssemblyError::DimensionExists(name));
        }
        self.scalar_coords.insert(name, label.into());
        Ok(self)
    }

    fn validate(&self) -> Result<(), AssemblyError> {
        for (i, dim) in self.dims.iter().enumerate() {
            if self.dims[..i].iter().any(|d| d.name == dim.name) {
                return Err(AssemblyError::DuplicateDimension(dim.name.clone()));
            }
            if self.scalar_coords.contains_key(&dim.name) {
                return Err(AssemblyError::DimensionExists(dim.name.clone()));
            }
            for (j, label) in dim.labels.iter().enumerate() {
                if dim.labels[..j].contains(label) {
                    return Err(AssemblyError::DuplicateLabel {
                        dim: dim.name.clone(),
                        label: label.clone(),
                    });
                }
            }
        }
        let expected: usize = self.dims.iter().map(Dimension::len).product();
        if expected != self.values.len() {
            return Err(AssemblyError::ShapeMismatch {
                expected,
                actual: self.values.len(),
            });
        }
        Ok(())
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn dim_names(&self) -> Vec<&str> {
        self.dims.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(Dimension::len).collect()
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn scalar_coords(&self) -> &IndexMap<String, Label> {
        &self.scalar_coords
    }

    pub fn scalar_coord(&self, name: &str) -> Option<&Label> {
        self.scalar_coords.get(name)
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dims.iter().find(|d| d.name == name)
    }

    pub fn axis(&self, name: &str) -> Result<usize, AssemblyError> {
        self.dims
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| AssemblyError::UnknownDimension(name.to_string()))
    }

    /// The single value of a 0-d (or all-size-1) assembly.
    pub fn item(&self) -> Result<f64, AssemblyError> {
        if self.values.len() != 1 {
            return Err(AssemblyError::NotScalar(self.values.len()));
        }
        Ok(self.values[0])
    }

    /// Value at fully specified labels.
    pub fn get(&self, key: &[(&str, Label)]) -> Result<f64, AssemblyError> {
        let selectors: Vec<(&str, Selector<Label>)> = key
            .iter()
            .map(|(dim, label)| (*dim, Selector::One(label.clone())))
            .collect();
        let picked = self.sel(&selectors)?;
        if picked.ndim() > 0 {
            return Err(AssemblyError::NotScalar(picked.len()));
        }
        picked.item()
    }

    pub fn sel(&self, selectors: &[(&str, Selector<Label>)]) -> Result<Self, AssemblyError> {
        let picks = self.picks_from_labels(selectors)?;
        Ok(self.take(&picks))
    }

    pub fn isel(&self, selectors: &[(&str, Selector<usize>)]) -> Result<Self, AssemblyError> {
        let picks = self.picks_from_positions(selectors)?;
        Ok(self.take(&picks))
    }

    /// Drops size-1 dimensions; an empty list squeezes every one of them.
    pub fn squeeze(&self, dims: &[&str]) -> Result<Self, AssemblyError> {
        let mut picks = vec![AxisPick::All; self.ndim()];
        if dims.is_empty() {
            for (axis, dim) in self.dims.iter().enumerate() {
                if dim.len() == 1 {
                    picks[axis] = AxisPick::One(0);
                }
            }
        } else {
            for name in dims {
                let axis = self.axis(name)?;
                let len = self.dims[axis].len();
                if len != 1 {
                    return Err(AssemblyError::NotSqueezable {
                        dim: name.to_string(),
                        len,
                    });
                }
                picks[axis] = AxisPick::One(0);
            }
        }
        Ok(self.take(&picks))
    }

    /// Prepends a size-1 dimension. A scalar coordinate of the same name is
    /// promoted and keeps its label.
    pub fn expand_dims(&self, name: &str, label: Option<Label>) -> Result<Self, AssemblyError> {
        if self.dimension(name).is_some() {
            return Err(AssemblyError::DimensionExists(name.to_string()));
        }
        let label = match (self.scalar_coords.get(name), label) {
            (Some(existing), Some(requested)) if existing != &requested => {
                return Err(AssemblyError::CoordinateConflict {
                    name: name.to_string(),
                    existing: existing.clone(),
                    requested,
                });
            }
            (Some(existing), _) => existing.clone(),
            (None, Some(requested)) => requested,
            (None, None) => Label::Int(0),
        };
        let mut out = self.clone();
        out.scalar_coords.shift_remove(name);
        out.dims.insert(
            0,
            Dimension {
                name: name.to_string(),
                labels: vec![label],
            },
        );
        Ok(out)
    }

    pub fn mean(&self, dims: &[&str]) -> Result<Self, AssemblyError> {
        self.reduce(&reduce::nanmean, dims)
    }

    pub fn sum(&self, dims: &[&str]) -> Result<Self, AssemblyError> {
        self.reduce(&reduce::nansum, dims)
    }

    pub fn std(&self, dims: &[&str]) -> Result<Self, AssemblyError> {
        self.reduce(&reduce::nanstd, dims)
    }

    pub fn min(&self, dims: &[&str]) -> Result<Self, AssemblyError> {
        self.reduce(&reduce::nanmin, dims)
    }

    /// Collapses the listed dimensions (all of them when empty) with `func`.
    pub fn reduce(&self, func: &dyn Fn(&[f64]) -> f64, dims: &[&str]) -> Result<Self, AssemblyError> {
        let mut reduced = vec![dims.is_empty(); self.ndim()];
        for name in dims {
            reduced[self.axis(name)?] = true;
        }

        let kept: Vec<Dimension> = self
            .dims
            .iter()
            .zip(&reduced)
            .filter(|(_, r)| !**r)
            .map(|(d, _)| d.clone())
            .collect();
        let kept_shape: Vec<usize> = kept.iter().map(Dimension::len).collect();
        let kept_strides = strides(&kept_shape);
        let out_len: usize = kept_shape.iter().product();

        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); out_len];
        let shape = self.shape();
        let mut cursor = vec![0usize; shape.len()];
        for &v in &self.values {
            let mut out_flat = 0usize;
            let mut k = 0usize;
            for (axis, &c) in cursor.iter().enumerate() {
                if !reduced[axis] {
                    out_flat += c * kept_strides[k];
                    k += 1;
                }
            }
            buckets[out_flat].push(v);
            advance(&mut cursor, &shape);
        }

        Ok(Self {
            dims: kept,
            scalar_coords: self.scalar_coords.clone(),
            values: buckets.iter().map(|b| func(b.as_slice())).collect(),
        })
    }

    /// Writes `value` into every addressed cell.
    pub fn assign(&mut self, key: &ItemKey, value: f64) -> Result<(), AssemblyError> {
        let picks = match key {
            ItemKey::Labels(sel) => {
                let sel: Vec<(&str, Selector<Label>)> =
                    sel.iter().map(|(d, s)| (d.as_str(), s.clone())).collect();
                self.picks_from_labels(&sel)?
            }
            ItemKey::Positions(sel) => {
                let sel: Vec<(&str, Selector<usize>)> =
                    sel.iter().map(|(d, s)| (d.as_str(), s.clone())).collect();
                self.picks_from_positions(&sel)?
            }
        };
        let positions = self.axis_positions(&picks);
        let strides = strides(&self.shape());
        let values = &mut self.values;
        for_each_flat(&strides, &positions, |flat| values[flat] = value);
        Ok(())
    }

    fn picks_from_labels(
        &self,
        selectors: &[(&str, Selector<Label>)],
    ) -> Result<Vec<AxisPick>, AssemblyError> {
        let mut picks = vec![AxisPick::All; self.ndim()];
        let mut seen = vec![false; self.ndim()];
        for (name, selector) in selectors {
            let axis = self.axis(name)?;
            if seen[axis] {
                return Err(AssemblyError::DuplicateDimension(name.to_string()));
            }
            seen[axis] = true;
            let dim = &self.dims[axis];
            let locate = |label: &Label| {
                dim.position(label).ok_or_else(|| AssemblyError::UnknownLabel {
                    dim: dim.name.clone(),
                    label: label.clone(),
                })
            };
            picks[axis] = match selector {
                Selector::One(label) => AxisPick::One(locate(label)?),
                Selector::Many(labels) => {
                    let positions = labels.iter().map(locate).collect::<Result<Vec<_>, _>>()?;
                    check_unique(dim, &positions)?;
                    AxisPick::Many(positions)
                }
            };
        }
        Ok(picks)
    }

    fn picks_from_positions(
        &self,
        selectors: &[(&str, Selector<usize>)],
    ) -> Result<Vec<AxisPick>, AssemblyError> {
        let mut picks = vec![AxisPick::All; self.ndim()];
        let mut seen = vec![false; self.ndim()];
        for (name, selector) in selectors {
            let axis = self.axis(name)?;
            if seen[axis] {
                return Err(AssemblyError::DuplicateDimension(name.to_string()));
            }
            seen[axis] = true;
            let dim = &self.dims[axis];
            let check = |index: usize| {
                if index < dim.len() {
                    Ok(index)
                } else {
                    Err(AssemblyError::IndexOutOfBounds {
                        dim: dim.name.clone(),
                        index,
                        len: dim.len(),
                    })
                }
            };
            picks[axis] = match selector {
                Selector::One(index) => AxisPick::One(check(*index)?),
                Selector::Many(indices) => {
                    let positions = indices
                        .iter()
                        .map(|&i| check(i))
                        .collect::<Result<Vec<_>, _>>()?;
                    check_unique(dim, &positions)?;
                    AxisPick::Many(positions)
                }
            };
        }
        Ok(picks)
    }

    fn axis_positions(&self, picks: &[AxisPick]) -> Vec<Vec<usize>> {
        self.dims
            .iter()
            .zip(picks)
            .map(|(dim, pick)| match pick {
                AxisPick::All => (0..dim.len()).collect(),
                AxisPick::One(p) => vec![*p],
                AxisPick::Many(ps) => ps.clone(),
            })
            .collect()
    }

    fn take(&self, picks: &[AxisPick]) -> Self {
        let mut dims = Vec::with_capacity(self.ndim());
        let mut scalar_coords = self.scalar_coords.clone();
        for (dim, pick) in self.dims.iter().zip(picks) {
            match pick {
                AxisPick::All => dims.push(dim.clone()),
                AxisPick::One(p) => {
                    scalar_coords.insert(dim.name.clone(), dim.labels[*p].clone());
                }
                AxisPick::Many(ps) => dims.push(Dimension {
                    name: dim.name.clone(),
                    labels: ps.iter().map(|&p| dim.labels[p].clone()).collect(),
                }),
            }
        }

        let positions = self.axis_positions(picks);
        let strides = strides(&self.shape());
        let mut values = Vec::with_capacity(positions.iter().map(Vec::len).product());
        for_each_flat(&strides, &positions, |flat| values.push(self.values[flat]));

        Self {
            dims,
            scalar_coords,
            values,
        }
    }
}

fn check_unique(dim: &Dimension, positions: &[usize]) -> Result<(), AssemblyError> {
    for (i, p) in positions.iter().enumerate() {
        if positions[..i].contains(p) {
            return Err(AssemblyError::DuplicateLabel {
                dim: dim.name.clone(),
                label: dim.labels[*p].clone(),
            });
        }
    }
    Ok(())
}

pub(crate) fn strides(shape: &[usize]) -> Vec<usize> {
    let mut out = vec![1usize; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        out[axis] = out[axis + 1] * shape[axis + 1];
    }
    out
}

/// Row-major odometer step. Returns false once every combination was seen.
pub(crate) fn advance(cursor: &mut [usize], lens: &[usize]) -> bool {
    for axis in (0..cursor.len()).rev() {
        cursor[axis] += 1;
        if cursor[axis] < lens[axis] {
            return true;
        }
        cursor[axis] = 0;
    }
    false
}

fn for_each_flat(strides: &[usize], positions: &[Vec<usize>], mut f: impl FnMut(usize)) {
    if positions.iter().any(Vec::is_empty) {
        return;
    }
    let lens: Vec<usize> = positions.iter().map(Vec::len).collect();
    let mut cursor = vec![0usize; positions.len()];
    loop {
        let flat = cursor
            .iter()
            .enumerate()
            .map(|(axis, &c)| positions[axis][c] * strides[axis])
            .sum::<usize>();
        f(flat);
        if !advance(&mut cursor, &lens) {
            break;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/assembly/tests.rs"]
mod tests;
