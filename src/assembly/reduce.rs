//! NaN-skipping reducers. Missing values never contribute.

fn finite(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| !v.is_nan())
}

pub fn nanmean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in finite(values) {
        sum += v;
        n += 1;
    }
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// All-missing input sums to zero.
pub fn nansum(values: &[f64]) -> f64 {
    finite(values).sum()
}

/// Population standard deviation (ddof = 0).
pub fn nanstd(values: &[f64]) -> f64 {
    let mean = nanmean(values);
    if mean.is_nan() {
        return f64::NAN;
    }
    let mut acc = 0.0;
    let mut n = 0usize;
    for v in finite(values) {
        let d = v - mean;
        acc += d * d;
        n += 1;
    }
    (acc / n as f64).sqrt()
}

pub fn nanmin(values: &[f64]) -> f64 {
    finite(values).fold(f64::NAN, |acc, v| if acc.is_nan() || v < acc { v } else { acc })
}

pub fn nanmax(values: &[f64]) -> f64 {
    finite(values).fold(f64::NAN, |acc, v| if acc.is_nan() || v > acc { v } else { acc })
}

/// Even counts average the two middle values.
pub fn nanmedian(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = finite(values).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/assembly/reduce.rs"]
mod tests;
