// 📂 Dataset loading - CSV → NameRow
// Source and normalizer output are aligned by position: row i of one is row i of the other

use crate::comparator::NameRow;
use anyhow::{Context, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Header names of the columns the auditor reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            name: "Name".to_string(),
            first_name: "First Name".to_string(),
            last_name: "Last Name".to_string(),
        }
    }
}

/// A CSV file read into memory with its header
struct Table {
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl Table {
    fn read(path: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {:?}", path))?;

        let headers = rdr
            .headers()
            .with_context(|| format!("Failed to read CSV header: {:?}", path))?
            .clone();

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result.with_context(|| format!("Failed to read CSV row in {:?}", path))?;
            records.push(record);
        }

        info!("Loaded {} rows from {:?}", records.len(), path);
        Ok(Table { headers, records })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Value of a column, or "" when the column or cell is missing
fn cell<'r>(record: &'r StringRecord, column: Option<usize>) -> &'r str {
    column.and_then(|i| record.get(i)).unwrap_or("")
}

/// Pair a source CSV (original names) with the normalizer's output CSV
pub fn load_aligned(source: &Path, output: &Path, columns: &ColumnNames) -> Result<Vec<NameRow>> {
    let source_table = Table::read(source)?;
    let output_table = Table::read(output)?;

    if source_table.records.len() != output_table.records.len() {
        warn!(
            "Row count mismatch: {} source rows vs {} output rows; comparing the first {}",
            source_table.records.len(),
            output_table.records.len(),
            source_table.records.len().min(output_table.records.len())
        );
    }

    let name_col = require_column(&source_table, &columns.name, source);
    let first_col = require_column(&output_table, &columns.first_name, output);
    let last_col = require_column(&output_table, &columns.last_name, output);

    Ok(source_table
        .records
        .iter()
        .zip(output_table.records.iter())
        .map(|(src, out)| {
            NameRow::new(
                cell(src, name_col),
                cell(out, first_col),
                cell(out, last_col),
            )
        })
        .collect())
}

/// Audit the output CSV alone; the original name comes from its own name column if present
pub fn load_output_only(output: &Path, columns: &ColumnNames) -> Result<Vec<NameRow>> {
    let table = Table::read(output)?;

    let name_col = table.column(&columns.name);
    let first_col = require_column(&table, &columns.first_name, output);
    let last_col = require_column(&table, &columns.last_name, output);

    Ok(table
        .records
        .iter()
        .map(|rec| {
            NameRow::new(
                cell(rec, name_col),
                cell(rec, first_col),
                cell(rec, last_col),
            )
        })
        .collect())
}

fn require_column(table: &Table, name: &str, path: &Path) -> Option<usize> {
    let column = table.column(name);
    if column.is_none() {
        warn!("Column {:?} not found in {:?}; treating it as empty", name, path);
    }
    column
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_aligned_pairs_rows_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.csv");
        let output = dir.path().join("output.csv");
        fs::write(&source, "Name,Company\n\"Jane Doe, MBA\",Acme\nMaria Garcia-Lopez,Beta\n").unwrap();
        fs::write(&output, "First Name,Last Name\nJane,MBA\nMaria,Garcia-Lopez\n").unwrap();

        let rows = load_aligned(&source, &output, &ColumnNames::default()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], NameRow::new("Jane Doe, MBA", "Jane", "MBA"));
        assert_eq!(rows[1].last_name(), "Garcia-Lopez");
    }

    #[test]
    fn test_load_aligned_truncates_to_shorter() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.csv");
        let output = dir.path().join("output.csv");
        fs::write(&source, "Name\nA B\nC D\nE F\n").unwrap();
        fs::write(&output, "First Name,Last Name\nA,B\n").unwrap();

        let rows = load_aligned(&source, &output, &ColumnNames::default()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_load_output_only_without_name_column() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.csv");
        fs::write(&output, "First Name,Last Name,Email\nJane,Business Coach,j@x.io\n,,\n").unwrap();

        let rows = load_output_only(&output, &ColumnNames::default()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].original(), "");
        assert_eq!(rows[0].last_name(), "Business Coach");
        assert_eq!(rows[1], NameRow::new("", "", ""));
    }

    #[test]
    fn test_custom_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.csv");
        fs::write(&output, "full,given,family\n\"Tom Reed, PMP\",Tom,PMP\n").unwrap();

        let columns = ColumnNames {
            name: "full".to_string(),
            first_name: "given".to_string(),
            last_name: "family".to_string(),
        };
        let rows = load_output_only(&output, &columns).unwrap();

        assert_eq!(rows[0], NameRow::new("Tom Reed, PMP", "Tom", "PMP"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");

        let err = load_output_only(&missing, &ColumnNames::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }
}
