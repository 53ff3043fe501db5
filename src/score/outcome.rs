use indexmap::IndexMap;

use crate::score::Score;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotRequested,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOutcome {
    Applied,
    Skipped(SkipReason),
}

impl RawOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        RawOutcome::Skipped(SkipReason::Failed(message.into()))
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, RawOutcome::Applied)
    }
}

/// Per-companion outcome of one forwarded operation, in companion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReport {
    outcomes: IndexMap<String, RawOutcome>,
}

impl RawReport {
    pub fn record(&mut self, key: &str, outcome: RawOutcome) {
        self.outcomes.insert(key.to_string(), outcome);
    }

    pub fn get(&self, key: &str) -> Option<&RawOutcome> {
        self.outcomes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawOutcome)> {
        self.outcomes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn all_applied(&self) -> bool {
        self.outcomes.values().all(RawOutcome::is_applied)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(k, v)| match v {
            RawOutcome::Skipped(SkipReason::Failed(msg)) => Some((k.as_str(), msg.as_str())),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Transformed {
    pub score: Score,
    pub report: RawReport,
}

impl Transformed {
    pub fn into_score(self) -> Score {
        self.score
    }
}
