use super::*;

#[test]
fn test_render_scalar_with_companion() {
    let raw = DataAssembly::from_1d("neuroid", ["a", "b"], vec![0.4, 0.6]).unwrap();
    let score = Score::scalar(0.5)
        .with_raw("raw", raw)
        .with_attr("ceiling", 0.8);
    let text = render_score_text(&score);
    assert!(text.starts_with("Score\n=====\n"));
    assert!(text.contains("Shape: scalar\n"));
    assert!(text.contains("Value: 0.500000\n"));
    assert!(text.contains("Attr ceiling: 0.8\n"));
    assert!(text.contains("Raw companion 'raw':\n"));
    assert!(text.contains("  Shape: neuroid=2\n"));
    assert!(text.contains("    neuroid: [a, b]\n"));
    assert!(text.contains("  Values: n=2 missing=0\n"));
}

#[test]
fn test_render_truncates_long_label_lists() {
    let labels: Vec<i64> = (0..10).collect();
    let values = DataAssembly::from_1d("neuroid", labels, vec![0.1; 10]).unwrap();
    let text = render_score_text(&Score::new(values));
    assert!(text.contains("neuroid: [0, 1, 2, 3, 4, 5, 6, 7, ... (+2)]"));
}

#[test]
fn test_render_multi_dim_shape_and_scalar_coords() {
    let values = DataAssembly::new(
        vec![
            Dimension::new("trial", [1, 2]),
            Dimension::new("neuroid", ["a", "b", "c"]),
        ],
        vec![0.1, 0.2, 0.3, f64::NAN, 0.5, 0.6],
    )
    .unwrap()
    .with_scalar_coord("region", "IT")
    .unwrap();
    let text = render_score_text(&Score::new(values));
    assert!(text.contains("Shape: trial=2 x neuroid=3\n"));
    assert!(text.contains("Scalar coords: region=IT\n"));
    assert!(text.contains("Values: n=6 missing=1\n"));
}
