//! Scoring substrate for brain benchmarks.
//!
//! Metrics compare two assemblies and return a [`Score`]. A score keeps its
//! pre-aggregation detail in named raw companions that follow the primary
//! value through selection, squeezing and merging.
//!
//! ```
//! use brainscore_core::prelude::*;
//!
//! let raw = DataAssembly::from_1d("neuroid", ["a", "b"], vec![0.4, 0.6]).unwrap();
//! let score = Score::new(raw.mean(&[]).unwrap()).with_raw("raw", raw);
//! assert!((score.item().unwrap() - 0.5).abs() < 1e-12);
//! ```

pub mod assembly;
pub mod io;
pub mod logging;
pub mod metric;
pub mod report;
pub mod score;

pub use assembly::{DataAssembly, Dimension, ItemKey, Label, Selector};
pub use metric::{Metric, MetricError};
pub use score::{Score, ScoreError};

pub mod prelude {
    pub use crate::assembly::{
        AssemblyError, DataAssembly, Dimension, ItemKey, Label, Selector, merge_assemblies,
    };
    pub use crate::metric::{Metric, MetricError, within_unit_interval};
    pub use crate::score::{
        MergeOptions, Operation, RawOutcome, RawPolicy, RawReport, Reducer, Score, ScoreError,
        SkipReason, Transformed,
    };
}
