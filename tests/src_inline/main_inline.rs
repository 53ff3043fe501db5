use super::*;

#[test]
fn test_parse_merge_defaults_to_tolerant() {
    let cli = Cli::try_parse_from(["brainscore-core", "merge", "a.json", "b.json.gz"]).unwrap();
    match cli.command {
        Commands::Merge {
            inputs,
            strict,
            output,
        } => {
            assert_eq!(inputs, vec![PathBuf::from("a.json"), PathBuf::from("b.json.gz")]);
            assert!(!strict);
            assert!(output.out.is_none());
        }
        _ => panic!("expected merge"),
    }
}

#[test]
fn test_parse_merge_requires_inputs() {
    assert!(Cli::try_parse_from(["brainscore-core", "merge"]).is_err());
}

#[test]
fn test_parse_sel_with_raw_flags() {
    let cli = Cli::try_parse_from([
        "brainscore-core",
        "sel",
        "--input",
        "s.json",
        "--dim",
        "trial",
        "--label",
        "1",
        "2",
        "--strict",
        "--out",
        "out.json",
        "-v",
    ])
    .unwrap();
    assert!(cli.verbose);
    match cli.command {
        Commands::Sel {
            dim, labels, raw, output, ..
        } => {
            assert_eq!(dim, "trial");
            assert_eq!(labels, vec!["1", "2"]);
            assert!(!raw.no_raw);
            assert!(raw.strict);
            assert_eq!(output.out, Some(PathBuf::from("out.json")));
        }
        _ => panic!("expected sel"),
    }
}

#[test]
fn test_parse_reduce_op() {
    let cli = Cli::try_parse_from([
        "brainscore-core",
        "reduce",
        "-i",
        "s.json",
        "--op",
        "median",
        "--dim",
        "neuroid",
    ])
    .unwrap();
    match cli.command {
        Commands::Reduce {
            op, dims, apply_raw, ..
        } => {
            assert_eq!(op, ReduceOp::Median);
            assert_eq!(dims, vec!["neuroid"]);
            assert!(!apply_raw);
        }
        _ => panic!("expected reduce"),
    }
    assert!(
        Cli::try_parse_from(["brainscore-core", "reduce", "-i", "s.json", "--op", "mode"]).is_err()
    );
}

#[test]
fn test_label_selector_parses_integers() {
    assert_eq!(
        label_selector(&["2".to_string()]),
        Selector::One(Label::Int(2))
    );
    assert_eq!(
        label_selector(&["a".to_string(), "3".to_string()]),
        Selector::Many(vec![Label::from("a"), Label::Int(3)])
    );
    assert_eq!(position_selector(&[4]), Selector::One(4));
    assert_eq!(position_selector(&[0, 1]), Selector::Many(vec![0, 1]));
}

#[test]
fn test_reduce_operation_mapping() {
    assert_eq!(reduce_operation(ReduceOp::Mean, &["trial"]).name(), "mean");
    assert_eq!(reduce_operation(ReduceOp::Std, &[]).name(), "std");
    let max = reduce_operation(ReduceOp::Max, &[]);
    assert_eq!(max.name(), "reduce");
    assert!(max.is_aggregation());
}

#[test]
fn test_raw_policy_from_flags() {
    let policy = raw_policy(true, false);
    assert!(policy.apply_raw);
    assert!(!policy.strict);
    assert_eq!(raw_policy(false, true), RawPolicy::skipping().strict());
}
