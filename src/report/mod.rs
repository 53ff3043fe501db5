pub mod text;

pub use text::render_score_text;

#[derive(Debug, Clone, PartialEq)]
pub struct ValueStats {
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub min: f64,
    pub median: f64,
    pub p90: f64,
    pub max: f64,
}

pub fn value_stats(values: &[f64]) -> ValueStats {
    let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    ValueStats {
        count: values.len(),
        missing: values.len() - finite.len(),
        mean: crate::assembly::reduce::nanmean(&finite),
        min: crate::assembly::reduce::nanmin(&finite),
        median: median(&finite),
        p90: p90(&finite),
        max: crate::assembly::reduce::nanmax(&finite),
    }
}

pub fn format_f64_6(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.6}", v)
    }
}

/// Nearest-rank quantile over the non-missing values; NaN when none.
pub fn quantile_indexed(values: &[f64], p: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let idx = ((n - 1) as f64 * p).ceil() as usize;
    sorted[idx]
}

pub fn median(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.5)
}

pub fn p90(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.90)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
