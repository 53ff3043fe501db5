/// Whether an operation is replayed on raw companions, and whether a
/// companion failure aborts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPolicy {
    pub apply_raw: bool,
    pub strict: bool,
}

impl RawPolicy {
    /// Default for selections, squeeze and expand_dims.
    pub fn applying() -> Self {
        Self {
            apply_raw: true,
            strict: false,
        }
    }

    /// Default for mean, sum, std, min and generic reductions.
    pub fn skipping() -> Self {
        Self {
            apply_raw: false,
            strict: false,
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOptions {
    /// Propagate a failed companion merge instead of omitting the companion.
    pub strict: bool,
}

impl MergeOptions {
    pub fn tolerant() -> Self {
        Self { strict: false }
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }
}
