use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::assembly::DataAssembly;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("brainscore_core_io_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample_score() -> Score {
    let raw = DataAssembly::from_1d("neuroid", ["a", "b"], vec![0.4, f64::NAN]).unwrap();
    Score::new(DataAssembly::from_1d("trial", [1], vec![0.5]).unwrap())
        .with_raw("raw", raw)
        .with_attr("ceiling", 0.8)
}

fn assert_same(a: &Score, b: &Score) {
    assert_eq!(a.values(), b.values());
    assert_eq!(a.attrs(), b.attrs());
    let (ra, rb) = (a.raw("raw").unwrap().values(), b.raw("raw").unwrap().values());
    assert_eq!(ra.dims(), rb.dims());
    assert_eq!(ra.values()[0], rb.values()[0]);
    assert!(rb.values()[1].is_nan());
}

#[test]
fn test_write_and_read_plain_json() {
    let dir = make_temp_dir();
    let path = dir.join("score.json");
    let score = sample_score();
    write_score(&path, &score, true).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"raw\""));
    let back = read_score(&path).unwrap();
    assert_same(&score, &back);
}

#[test]
fn test_write_and_read_gzip() {
    let dir = make_temp_dir();
    let path = dir.join("nested").join("score.json.gz");
    let score = sample_score();
    write_score(&path, &score, false).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    let back = read_score(&path).unwrap();
    assert_same(&score, &back);
}

#[test]
fn test_read_scores_in_order() {
    let dir = make_temp_dir();
    let paths: Vec<PathBuf> = (0..3).map(|i| dir.join(format!("s{i}.json"))).collect();
    for (i, path) in paths.iter().enumerate() {
        write_score(path, &Score::scalar(i as f64), false).unwrap();
    }
    let scores = read_scores(&paths).unwrap();
    let items: Vec<f64> = scores.iter().map(|s| s.item().unwrap()).collect();
    assert_eq!(items, vec![0.0, 1.0, 2.0]);
}

#[test]
fn test_empty_file_is_invalid_input() {
    let dir = make_temp_dir();
    let path = dir.join("empty.json");
    File::create(&path).unwrap();
    let err = read_score(&path).unwrap_err();
    assert!(matches!(err, ScoreIoError::InvalidInput(_)));
}

#[test]
fn test_malformed_json_names_the_file() {
    let dir = make_temp_dir();
    let path = dir.join("bad.json");
    fs::write(&path, "{\"values\": ").unwrap();
    let err = read_score(&path).unwrap_err();
    assert!(matches!(err, ScoreIoError::Json { .. }));
    assert!(err.to_string().contains("bad.json"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = make_temp_dir();
    let err = read_score(&dir.join("absent.json")).unwrap_err();
    assert!(matches!(err, ScoreIoError::Io(_)));
}
