//! CSV loading for datasets.
//!
//! Format: UTF-8, comma-separated, optional header row (detected when any
//! cell of the first row is non-numeric), double-quoted fields allowed. The
//! last column is the integer class index; every other column is a feature.

use std::path::Path;

use crate::data::dataset::Dataset;
use crate::error::{HarnessError, Result};

/// Reads and parses a CSV file.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text)
}

/// Parses CSV text into a `Dataset`.
pub fn parse_csv(text: &str) -> Result<Dataset> {
    let mut lines = text.lines().peekable();

    if let Some(first) = lines.peek() {
        if is_header(first) {
            lines.next();
        }
    }

    let mut features: Vec<Vec<f64>> = Vec::new();
    let mut labels: Vec<usize> = Vec::new();

    for (row_idx, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cells = parse_csv_row(line);
        let Some((label_cell, feature_cells)) = cells.split_last() else {
            continue;
        };
        if feature_cells.is_empty() {
            return Err(HarnessError::dataset(format!(
                "row {}: expected features plus a class index, got 1 column",
                row_idx + 1
            )));
        }

        let row = parse_floats(feature_cells, row_idx + 1)?;
        let class_idx = label_cell.trim().parse::<usize>().map_err(|_| {
            HarnessError::dataset(format!(
                "row {}: class index '{}' is not a non-negative integer",
                row_idx + 1,
                label_cell
            ))
        })?;

        features.push(row);
        labels.push(class_idx);
    }

    if features.is_empty() {
        return Err(HarnessError::dataset("CSV contains no data rows"));
    }

    Dataset::new(features, labels)
}

/// Returns `true` if the row looks like a header (any cell non-numeric).
fn is_header(line: &str) -> bool {
    parse_csv_row(line).iter().any(|c| {
        let t = c.trim();
        !t.is_empty() && t.parse::<f64>().is_err()
    })
}

/// Splits one CSV row, honouring double quotes and `""` escapes.
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_floats(cells: &[String], row_num: usize) -> Result<Vec<f64>> {
    cells.iter()
        .map(|c| {
            c.trim().parse::<f64>().map_err(|_| {
                HarnessError::dataset(format!("row {row_num}: '{c}' is not a valid number"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_with_header() {
        let ds = parse_csv("x,y,label\n0.5,1.0,1\n0.1,0.2,0\n").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.feature_width(), 2);
        assert_eq!(ds.labels(), &[1, 0]);
    }

    #[test]
    fn test_parses_quoted_cells() {
        let ds = parse_csv("\"1.5\",2,0\n").unwrap();
        assert_eq!(ds.features(), &[vec![1.5, 2.0]]);
    }

    #[test]
    fn test_rejects_fractional_label() {
        let err = parse_csv("1.0,2.0,0.5\n").unwrap_err();
        assert!(err.to_string().contains("class index"));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        assert!(parse_csv("1,2,0\n1,0\n").is_err());
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(parse_csv("a,b,label\n").is_err());
    }
}
