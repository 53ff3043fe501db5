//! Score files: JSON, optionally gzip-compressed (`.gz` suffix).

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::score::Score;

#[derive(Debug, thiserror::Error)]
pub enum ScoreIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, ScoreIoError> {
    let file = File::open(path)?;
    if is_gz(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn read_score(path: &Path) -> Result<Score, ScoreIoError> {
    let mut reader = open_maybe_gz(path)?;
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    if text.trim().is_empty() {
        return Err(ScoreIoError::InvalidInput(format!(
            "score file {} is empty",
            path.display()
        )));
    }
    serde_json::from_str(&text).map_err(|source| ScoreIoError::Json {
        path: path.display().to_string(),
        source,
    })
}

pub fn read_scores(paths: &[PathBuf]) -> Result<Vec<Score>, ScoreIoError> {
    paths.iter().map(|p| read_score(p)).collect()
}

pub fn to_json_string(score: &Score, pretty: bool) -> Result<String, ScoreIoError> {
    let out = if pretty {
        serde_json::to_string_pretty(score)
    } else {
        serde_json::to_string(score)
    };
    out.map_err(|source| ScoreIoError::Json {
        path: "<memory>".to_string(),
        source,
    })
}

pub fn write_score(path: &Path, score: &Score, pretty: bool) -> Result<(), ScoreIoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = to_json_string(score, pretty)?;
    let file = BufWriter::new(File::create(path)?);
    if is_gz(path) {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(json.as_bytes())?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        file.write_all(json.as_bytes())?;
        file.flush()?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/io/tests.rs"]
mod tests;
