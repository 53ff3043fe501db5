use crate::assembly::{DataAssembly, Dimension};
use crate::report::{format_f64_6, value_stats};
use crate::score::Score;

const MAX_LABELS_SHOWN: usize = 8;

pub fn render_score_text(score: &Score) -> String {
    let mut out = String::new();
    out.push_str("Score\n");
    out.push_str("=====\n");
    render_section(&mut out, score, 0);
    out
}

fn render_section(out: &mut String, score: &Score, depth: usize) {
    let pad = "  ".repeat(depth);
    let values = score.values();

    out.push_str(&format!("{pad}Shape: {}\n", shape_line(values)));
    for dim in values.dims() {
        out.push_str(&format!("{pad}  {}: {}\n", dim.name, labels_line(dim)));
    }
    if !values.scalar_coords().is_empty() {
        let coords = values
            .scalar_coords()
            .iter()
            .map(|(name, label)| format!("{name}={label}"))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("{pad}Scalar coords: {coords}\n"));
    }

    if values.len() == 1 {
        out.push_str(&format!("{pad}Value: {}\n", format_f64_6(values.values()[0])));
    } else {
        let stats = value_stats(values.values());
        out.push_str(&format!(
            "{pad}Values: n={} missing={}\n",
            stats.count, stats.missing
        ));
        out.push_str(&format!(
            "{pad}  mean={} min={} median={} p90={} max={}\n",
            format_f64_6(stats.mean),
            format_f64_6(stats.min),
            format_f64_6(stats.median),
            format_f64_6(stats.p90),
            format_f64_6(stats.max)
        ));
    }

    for (key, value) in score.attrs() {
        out.push_str(&format!("{pad}Attr {key}: {value}\n"));
    }

    for (key, companion) in score.raw_companions() {
        out.push_str(&format!("{pad}Raw companion '{key}':\n"));
        render_section(out, companion, depth + 1);
    }
}

fn shape_line(values: &DataAssembly) -> String {
    if values.ndim() == 0 {
        return "scalar".to_string();
    }
    values
        .dims()
        .iter()
        .map(|d| format!("{}={}", d.name, d.len()))
        .collect::<Vec<_>>()
        .join(" x ")
}

fn labels_line(dim: &Dimension) -> String {
    let shown = dim
        .labels
        .iter()
        .take(MAX_LABELS_SHOWN)
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if dim.len() > MAX_LABELS_SHOWN {
        format!("[{shown}, ... (+{})]", dim.len() - MAX_LABELS_SHOWN)
    } else {
        format!("[{shown}]")
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
