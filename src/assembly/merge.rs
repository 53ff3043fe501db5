//! Outer-join merge of assemblies.
//!
//! Scalar coordinates that differ between inputs (or that are a dimension on
//! some of them) become leading dimensions first, so scores taken at
//! different `trial`s stack along `trial`. Labels are then unioned per
//! dimension in first-appearance order. Uncovered cells stay NaN; a NaN never
//! conflicts with a value, two different values do.

use std::collections::HashMap;

use crate::assembly::{AssemblyError, DataAssembly, Dimension, Label, advance, strides};

pub fn merge_assemblies(inputs: &[DataAssembly]) -> Result<DataAssembly, AssemblyError> {
    let (first, rest) = inputs.split_first().ok_or(AssemblyError::EmptyMerge)?;
    if rest.is_empty() {
        return Ok(first.clone());
    }

    let aligned = promote_differing_coords(inputs)?;
    let reference: Vec<String> = aligned[0]
        .dims()
        .iter()
        .map(|d| d.name.clone())
        .collect();
    for a in &aligned[1..] {
        let names = a.dim_names();
        let same = names.len() == reference.len()
            && reference.iter().all(|r| names.contains(&r.as_str()));
        if !same {
            return Err(AssemblyError::DimensionMismatch {
                expected: reference.clone(),
                found: names.iter().map(|s| s.to_string()).collect(),
            });
        }
    }

    let mut out_dims: Vec<Dimension> = reference
        .iter()
        .map(|name| Dimension {
            name: name.clone(),
            labels: Vec::new(),
        })
        .collect();
    let mut lookup: Vec<HashMap<Label, usize>> = vec![HashMap::new(); reference.len()];
    for a in &aligned {
        for (k, name) in reference.iter().enumerate() {
            let Some(dim) = a.dimension(name) else {
                continue;
            };
            for label in &dim.labels {
                if !lookup[k].contains_key(label) {
                    lookup[k].insert(label.clone(), out_dims[k].labels.len());
                    out_dims[k].labels.push(label.clone());
                }
            }
        }
    }

    let out_shape: Vec<usize> = out_dims.iter().map(Dimension::len).collect();
    let out_strides = strides(&out_shape);
    let total: usize = out_shape.iter().product();
    let mut values = vec![f64::NAN; total];

    for a in &aligned {
        // (output axis, output position of each input label) per input axis
        let mut maps: Vec<(usize, Vec<usize>)> = Vec::with_capacity(a.ndim());
        for dim in a.dims() {
            let k = reference
                .iter()
                .position(|r| r == &dim.name)
                .ok_or_else(|| AssemblyError::UnknownDimension(dim.name.clone()))?;
            let positions = dim.labels.iter().map(|l| lookup[k][l]).collect();
            maps.push((k, positions));
        }

        let shape = a.shape();
        let mut cursor = vec![0usize; shape.len()];
        for &incoming in a.values() {
            let flat: usize = maps
                .iter()
                .zip(&cursor)
                .map(|((k, positions), &c)| positions[c] * out_strides[*k])
                .sum();
            let existing = values[flat];
            if existing.is_nan() {
                values[flat] = incoming;
            } else if !incoming.is_nan() && existing != incoming {
                return Err(AssemblyError::MergeConflict {
                    location: describe_location(&out_dims, flat),
                    existing,
                    incoming,
                });
            }
            advance(&mut cursor, &shape);
        }
    }

    let mut out = DataAssembly::new(out_dims, values)?;
    for (name, label) in aligned[0].scalar_coords() {
        out = out.with_scalar_coord(name.clone(), label.clone())?;
    }
    Ok(out)
}

fn promote_differing_coords(inputs: &[DataAssembly]) -> Result<Vec<DataAssembly>, AssemblyError> {
    let mut names: Vec<&String> = Vec::new();
    for a in inputs {
        for name in a.scalar_coords().keys() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let mut promote: Vec<&str> = Vec::new();
    let mut carry: Vec<(&str, Label)> = Vec::new();
    for name in names {
        let labels: Vec<Option<&Label>> = inputs.iter().map(|a| a.scalar_coord(name)).collect();
        let is_dim_somewhere = inputs.iter().any(|a| a.dimension(name).is_some());
        let missing = inputs
            .iter()
            .any(|a| a.dimension(name).is_none() && a.scalar_coord(name).is_none());
        let present: Vec<&Label> = labels.iter().flatten().copied().collect();
        let all_equal = present.windows(2).all(|w| w[0] == w[1]);

        if !is_dim_somewhere && all_equal {
            // identical (or only partially present) scalars survive as scalars
            carry.push((name.as_str(), present[0].clone()));
            continue;
        }
        if missing {
            return Err(AssemblyError::MissingCoordinate(name.clone()));
        }
        promote.push(name.as_str());
    }

    let mut out = inputs.to_vec();
    for name in promote.iter().rev() {
        for a in out.iter_mut() {
            if a.scalar_coord(name).is_some() {
                *a = a.expand_dims(name, None)?;
            }
        }
    }
    for a in out.iter_mut() {
        for (name, label) in &carry {
            if a.scalar_coord(name).is_none() {
                *a = a.clone().with_scalar_coord(*name, label.clone())?;
            }
        }
    }
    Ok(out)
}

fn describe_location(dims: &[Dimension], flat: usize) -> String {
    let shape: Vec<usize> = dims.iter().map(Dimension::len).collect();
    let strides = strides(&shape);
    let mut parts = Vec::with_capacity(dims.len());
    for (axis, dim) in dims.iter().enumerate() {
        let pos = (flat / strides[axis]) % shape[axis];
        parts.push(format!("{}={}", dim.name, dim.labels[pos]));
    }
    parts.join(", ")
}

#[cfg(test)]
#[path = "../../tests/src_inline/assembly/merge.rs"]
mod tests;
