use super::*;

fn trial_neuroid() -> DataAssembly {
    DataAssembly::new(
        vec![
            Dimension::new("trial", [1, 2]),
            Dimension::new("neuroid", ["a", "b", "c"]),
        ],
        vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
    )
    .unwrap()
}

#[test]
fn test_new_rejects_shape_mismatch() {
    let err = DataAssembly::from_1d("neuroid", ["a", "b"], vec![1.0]).unwrap_err();
    assert_eq!(
        err,
        AssemblyError::ShapeMismatch {
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn test_new_rejects_duplicate_labels_and_dims() {
    let err = DataAssembly::from_1d("neuroid", ["a", "a"], vec![1.0, 2.0]).unwrap_err();
    assert!(matches!(err, AssemblyError::DuplicateLabel { .. }));

    let err = DataAssembly::new(
        vec![Dimension::new("x", [0]), Dimension::new("x", [1])],
        vec![1.0],
    )
    .unwrap_err();
    assert_eq!(err, AssemblyError::DuplicateDimension("x".to_string()));
}

#[test]
fn test_label_parse_prefers_integers() {
    assert_eq!(Label::parse("12"), Label::Int(12));
    assert_eq!(Label::parse("-3"), Label::Int(-3));
    assert_eq!(Label::parse("IT"), Label::Str("IT".to_string()));
}

#[test]
fn test_sel_one_drops_dimension_and_keeps_scalar_coord() {
    let a = trial_neuroid();
    let out = a.sel(&[("trial", Selector::one(2))]).unwrap();
    assert_eq!(out.dim_names(), vec!["neuroid"]);
    assert_eq!(out.values(), &[0.4, 0.5, 0.6]);
    assert_eq!(out.scalar_coord("trial"), Some(&Label::Int(2)));
}

#[test]
fn test_sel_many_keeps_order_given() {
    let a = trial_neuroid();
    let out = a.sel(&[("neuroid", Selector::many(["c", "a"]))]).unwrap();
    assert_eq!(out.shape(), vec![2, 2]);
    assert_eq!(out.values(), &[0.3, 0.1, 0.6, 0.4]);
    assert_eq!(
        out.dimension("neuroid").unwrap().labels,
        vec![Label::from("c"), Label::from("a")]
    );
}

#[test]
fn test_sel_unknown_label_and_dimension() {
    let a = trial_neuroid();
    let err = a.sel(&[("neuroid", Selector::one("z"))]).unwrap_err();
    assert!(matches!(err, AssemblyError::UnknownLabel { .. }));
    let err = a.sel(&[("subject", Selector::one(0))]).unwrap_err();
    assert_eq!(err, AssemblyError::UnknownDimension("subject".to_string()));
}

#[test]
fn test_isel_positions_and_bounds() {
    let a = trial_neuroid();
    let out = a
        .isel(&[("trial", Selector::One(0)), ("neuroid", Selector::Many(vec![2]))])
        .unwrap();
    assert_eq!(out.dim_names(), vec!["neuroid"]);
    assert_eq!(out.values(), &[0.3]);

    let err = a.isel(&[("neuroid", Selector::One(3))]).unwrap_err();
    assert_eq!(
        err,
        AssemblyError::IndexOutOfBounds {
            dim: "neuroid".to_string(),
            index: 3,
            len: 3
        }
    );
}

#[test]
fn test_get_and_item() {
    let a = trial_neuroid();
    let v = a
        .get(&[("trial", Label::from(2)), ("neuroid", Label::from("b"))])
        .unwrap();
    assert_eq!(v, 0.5);
    assert!(matches!(a.item(), Err(AssemblyError::NotScalar(6))));
    assert_eq!(DataAssembly::scalar(0.25).item().unwrap(), 0.25);
}

#[test]
fn test_squeeze_all_and_named() {
    let a = DataAssembly::new(
        vec![Dimension::new("trial", [7]), Dimension::new("neuroid", ["a", "b"])],
        vec![1.0, 2.0],
    )
    .unwrap();
    let out = a.squeeze(&[]).unwrap();
    assert_eq!(out.dim_names(), vec!["neuroid"]);
    assert_eq!(out.scalar_coord("trial"), Some(&Label::Int(7)));

    let err = a.squeeze(&["neuroid"]).unwrap_err();
    assert_eq!(
        err,
        AssemblyError::NotSqueezable {
            dim: "neuroid".to_string(),
            len: 2
        }
    );
}

#[test]
fn test_expand_dims_promotes_scalar_coord() {
    let a = DataAssembly::from_1d("neuroid", ["a", "b"], vec![1.0, 2.0])
        .unwrap()
        .with_scalar_coord("trial", 3)
        .unwrap();
    let out = a.expand_dims("trial", None).unwrap();
    assert_eq!(out.dim_names(), vec!["trial", "neuroid"]);
    assert_eq!(out.dimension("trial").unwrap().labels, vec![Label::Int(3)]);
    assert!(out.scalar_coord("trial").is_none());

    let err = a.expand_dims("trial", Some(Label::Int(4))).unwrap_err();
    assert!(matches!(err, AssemblyError::CoordinateConflict { .. }));
    let err = out.expand_dims("neuroid", None).unwrap_err();
    assert_eq!(err, AssemblyError::DimensionExists("neuroid".to_string()));
}

#[test]
fn test_expand_dims_new_label_defaults_to_zero() {
    let out = DataAssembly::scalar(0.5).expand_dims("split", None).unwrap();
    assert_eq!(out.shape(), vec![1]);
    assert_eq!(out.dimension("split").unwrap().labels, vec![Label::Int(0)]);
}

#[test]
fn test_mean_over_dimension_and_all() {
    let a = trial_neuroid();
    let per_trial = a.mean(&["neuroid"]).unwrap();
    assert_eq!(per_trial.dim_names(), vec!["trial"]);
    assert!((per_trial.values()[0] - 0.2).abs() < 1e-12);
    assert!((per_trial.values()[1] - 0.5).abs() < 1e-12);

    let all = a.mean(&[]).unwrap();
    assert_eq!(all.ndim(), 0);
    assert!((all.item().unwrap() - 0.35).abs() < 1e-12);
}

#[test]
fn test_reductions_keep_scalar_coords_and_skip_nan() {
    let a = DataAssembly::from_1d("neuroid", ["a", "b", "c"], vec![1.0, f64::NAN, 3.0])
        .unwrap()
        .with_scalar_coord("region", "IT")
        .unwrap();
    assert_eq!(a.sum(&[]).unwrap().item().unwrap(), 4.0);
    assert_eq!(a.min(&["neuroid"]).unwrap().item().unwrap(), 1.0);
    assert!((a.std(&[]).unwrap().item().unwrap() - 1.0).abs() < 1e-12);
    assert_eq!(
        a.mean(&[]).unwrap().scalar_coord("region"),
        Some(&Label::from("IT"))
    );
}

#[test]
fn test_generic_reduce_over_trial() {
    let a = trial_neuroid();
    let out = a
        .reduce(&|v: &[f64]| v.iter().copied().fold(f64::MIN, f64::max), &["trial"])
        .unwrap();
    assert_eq!(out.dim_names(), vec!["neuroid"]);
    assert_eq!(out.values(), &[0.4, 0.5, 0.6]);
}

#[test]
fn test_assign_by_label_broadcasts_unmentioned_dims() {
    let mut a = trial_neuroid();
    a.assign(&ItemKey::label("trial", 1), 0.0).unwrap();
    assert_eq!(a.values(), &[0.0, 0.0, 0.0, 0.4, 0.5, 0.6]);

    a.assign(
        &ItemKey::Positions(vec![
            ("trial".to_string(), Selector::One(1)),
            ("neuroid".to_string(), Selector::Many(vec![0, 2])),
        ]),
        9.0,
    )
    .unwrap();
    assert_eq!(a.values(), &[0.0, 0.0, 0.0, 9.0, 0.5, 9.0]);
}

#[test]
fn test_assign_unknown_label_leaves_values_untouched() {
    let mut a = trial_neuroid();
    let before = a.clone();
    assert!(a.assign(&ItemKey::label("neuroid", "z"), 1.0).is_err());
    assert_eq!(a, before);
}

#[test]
fn test_json_nan_travels_as_null() {
    let a = DataAssembly::from_1d("neuroid", ["a", "b"], vec![0.5, f64::NAN]).unwrap();
    let json = serde_json::to_string(&a).unwrap();
    assert!(json.contains("null"));
    let back: DataAssembly = serde_json::from_str(&json).unwrap();
    assert_eq!(back.values()[0], 0.5);
    assert!(back.values()[1].is_nan());
}

#[test]
fn test_json_rejects_inconsistent_shape() {
    let json = r#"{"dims":[{"name":"x","labels":[0,1]}],"values":[1.0]}"#;
    assert!(serde_json::from_str::<DataAssembly>(json).is_err());
}
