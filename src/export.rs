//! Matrix persistence: CSV and JSON lines.
//!
//! CSV files carry a header `index,0,1,...,W-1`; the first column holds the
//! input position of the event behind each row. JSONL files hold one JSON
//! array of `W` numbers per line.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::tokenizer::TokenMatrix;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("row {row}: expected {expected} columns, got {got}")]
    Shape {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("row {row}: invalid number '{value}'")]
    Number { row: usize, value: String },
}

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Jsonl,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Jsonl => "jsonl",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "jsonl" => Ok(ExportFormat::Jsonl),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}

/// Writes the matrix as CSV with an index column.
pub fn write_csv<W: Write>(matrix: &TokenMatrix, out: W) -> Result<(), ExportError> {
    let mut w = csv::Writer::from_writer(out);
    let header =
        std::iter::once("index".to_string()).chain((0..matrix.width()).map(|i| i.to_string()));
    w.write_record(header)?;
    for (i, row) in matrix.rows().enumerate() {
        let record = std::iter::once(matrix.source_index(i).to_string())
            .chain(row.iter().map(|v| v.to_string()));
        w.write_record(record)?;
    }
    w.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes one JSON array per row.
pub fn write_jsonl<W: Write>(matrix: &TokenMatrix, out: &mut W) -> Result<(), ExportError> {
    for row in matrix.rows() {
        serde_json::to_writer(&mut *out, row)?;
        writeln!(out).map_err(serde_json::Error::io)?;
    }
    out.flush().map_err(serde_json::Error::io)?;
    Ok(())
}

/// Reads a CSV written by `write_csv` back into a matrix.
pub fn read_csv<R: Read>(input: R) -> Result<TokenMatrix, ExportError> {
    let mut r = csv::Reader::from_reader(input);
    let width = r.headers()?.len().saturating_sub(1);
    let mut matrix = TokenMatrix::new(width);
    let mut values = vec![0.0f32; width];
    for (row, record) in r.records().enumerate() {
        let record = record?;
        if record.len() != width + 1 {
            return Err(ExportError::Shape {
                row,
                expected: width + 1,
                got: record.len(),
            });
        }
        let number_error = |value: &str| ExportError::Number {
            row,
            value: value.to_string(),
        };
        let index: usize = record[0].parse().map_err(|_| number_error(&record[0]))?;
        for (slot, field) in record.iter().skip(1).enumerate() {
            values[slot] = field.parse().map_err(|_| number_error(field))?;
        }
        matrix.push_row(index, &values);
    }
    Ok(matrix)
}

/// Writes one match to `<dir>/<stem>.<ext>`, creating `dir` if needed.
pub fn write_match(
    matrix: &TokenMatrix,
    dir: &Path,
    stem: &str,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    let io = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ExportError::Io { path, source }
    };
    fs::create_dir_all(dir).map_err(io(dir))?;
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    let file = File::create(&path).map_err(io(path.as_path()))?;
    let mut out = BufWriter::new(file);
    match format {
        ExportFormat::Csv => write_csv(matrix, &mut out)?,
        ExportFormat::Jsonl => write_jsonl(matrix, &mut out)?,
    }
    out.flush().map_err(io(path.as_path()))?;
    debug!(path = %path.display(), rows = matrix.len(), "match written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TokenMatrix {
        let mut m = TokenMatrix::new(3);
        m.push_row(4, &[0.5, 0.0, 1.0]);
        m.push_row(7, &[0.25, 0.125, 0.0]);
        m
    }

    #[test]
    fn csv_layout() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["index,0,1,2", "4,0.5,0,1", "7,0.25,0.125,0"]);
    }

    #[test]
    fn csv_reads_back() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        assert_eq!(read_csv(buf.as_slice()).unwrap(), sample());
    }

    #[test]
    fn ragged_csv_is_rejected() {
        let err = read_csv("index,0,1\n0,0.5\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ExportError::Csv(_) | ExportError::Shape { .. }));
    }

    #[test]
    fn jsonl_lines_are_arrays() {
        let mut buf = Vec::new();
        write_jsonl(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<Vec<f32>> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows, vec![vec![0.5, 0.0, 1.0], vec![0.25, 0.125, 0.0]]);
    }

    #[test]
    fn write_match_names_file_after_stem() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let path = write_match(&sample(), &out, "16265", ExportFormat::Csv).unwrap();
        assert_eq!(path, out.join("16265.csv"));
        assert!(fs::read_to_string(path).unwrap().starts_with("index,0,1,2"));
    }

    #[test]
    fn format_parses() {
        assert_eq!("JSONL".parse::<ExportFormat>(), Ok(ExportFormat::Jsonl));
        assert!("parquet".parse::<ExportFormat>().is_err());
    }
}
