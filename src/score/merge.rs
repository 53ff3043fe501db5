use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::assembly::{AssemblyError, DataAssembly, merge_assemblies};
use crate::score::{MergeOptions, RawOutcome, RawReport, Score, ScoreError, Transformed};

impl Score {
    /// Merges scores and, recursively, their raw companions. A companion
    /// that fails to merge is dropped with a warning.
    pub fn merge(scores: &[Score]) -> Result<Score, ScoreError> {
        Ok(Self::merge_with(scores, MergeOptions::default())?.score)
    }

    /// Companion keys are read from the first score only. Every later score
    /// must carry each of them (`MissingRawKey` otherwise, whatever the
    /// options); companions found only on later scores are not merged.
    pub fn merge_with(scores: &[Score], options: MergeOptions) -> Result<Transformed, ScoreError> {
        let refs: Vec<&Score> = scores.iter().collect();
        merge_refs(&refs, options)
    }
}

fn merge_refs(scores: &[&Score], options: MergeOptions) -> Result<Transformed, ScoreError> {
    let first = *scores.first().ok_or(AssemblyError::EmptyMerge)?;
    let primaries: Vec<DataAssembly> = scores.iter().map(|s| s.values.clone()).collect();
    let values = merge_assemblies(&primaries)?;

    let mut raw = IndexMap::new();
    let mut report = RawReport::default();
    for key in first.raw.keys() {
        let mut group = Vec::with_capacity(scores.len());
        for (index, score) in scores.iter().enumerate() {
            let companion = score.raw.get(key).ok_or_else(|| ScoreError::MissingRawKey {
                key: key.clone(),
                index,
            })?;
            group.push(companion);
        }

        // nested companion merges never abort the level above
        match merge_refs(&group, MergeOptions::tolerant()) {
            Ok(merged) => {
                raw.insert(key.clone(), merged.score);
                report.record(key, RawOutcome::Applied);
            }
            Err(err) if options.strict => {
                return Err(ScoreError::RawMerge {
                    key: key.clone(),
                    source: Box::new(err),
                });
            }
            Err(err) => {
                warn!(key = %key, error = %err, "failed to merge raw companion; omitting it");
                report.record(key, RawOutcome::failed(err.to_string()));
            }
        }
    }

    Ok(Transformed {
        score: Score {
            values,
            attrs: shared_attrs(scores),
            raw,
        },
        report,
    })
}

/// Attributes every input agrees on.
fn shared_attrs(scores: &[&Score]) -> IndexMap<String, Value> {
    let Some((first, rest)) = scores.split_first() else {
        return IndexMap::new();
    };
    first
        .attrs
        .iter()
        .filter(|(k, v)| rest.iter().all(|s| s.attrs.get(*k) == Some(*v)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/score/merge.rs"]
mod tests;
