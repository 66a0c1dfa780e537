//! Tabular row I/O. The matching engine itself only ever sees `Vec<Row>`;
//! this module is the concrete collaborator that turns a CSV/TSV file on
//! disk into rows and back, keeping the `csv` crate and its delimiter
//! quirks out of every other module.

use std::path::Path;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::row::{Cell, Row};

#[derive(Debug, Error)]
pub enum RowIoError {
	#[error("failed to open {0}: {1}")]
	Open(String, String),
	#[error("failed to read {0}: {1}")]
	Read(String, String),
	#[error("failed to write {0}: {1}")]
	Write(String, String),
}

fn sniff_delimiter(path: &Path) -> u8 {
	match path.extension().and_then(|e| e.to_str()) {
		Some("tsv") | Some("tab") => b'\t',
		Some("psv") | Some("pipe") => b'|',
		_ => b',',
	}
}

/// Load a tabular file into rows, lowercasing/trimming headers and applying
/// the Salesforce-export cleanup rule: if the first header begins with
/// "unnamed", drop the first column and any row whose first cell matches
/// `\[.*\]` — both are artifacts of exporting a report with a leading
/// row-selector column and a trailing subtotal/grouping row.
pub fn load_rows(path: &Path) -> Result<Vec<Row>, RowIoError> {
	let display = path.display().to_string();
	let mut reader = csv::ReaderBuilder::new()
		.delimiter(sniff_delimiter(path))
		.from_path(path)
		.map_err(|e| RowIoError::Open(display.clone(), e.to_string()))?;

	let headers: Vec<String> = reader
		.headers()
		.map_err(|e| RowIoError::Read(display.clone(), e.to_string()))?
		.iter()
		.map(|h| h.to_lowercase().trim().to_string())
		.collect();

	let drop_first_column = headers
		.first()
		.is_some_and(|h| h.starts_with("unnamed"));

	let junk_pattern = Regex::new(r"\[.*\]").expect("static pattern is valid");

	let mut rows = Vec::new();
	for result in reader.records() {
		let record = result.map_err(|e| RowIoError::Read(display.clone(), e.to_string()))?;

		if drop_first_column
			&& let Some(first_cell) = record.get(0)
			&& junk_pattern.is_match(first_cell)
		{
			continue;
		}

		let mut row = Row::new();
		for (idx, header) in headers.iter().enumerate() {
			if drop_first_column && idx == 0 {
				continue;
			}
			let value = record.get(idx).unwrap_or("").trim();
			row.set(header.clone(), Cell::from(value));
		}
		rows.push(row);
	}

	if drop_first_column {
		debug!(file = %display, "Salesforce export format detected; dropped leading unnamed column");
	}

	debug!(file = %display, rows = rows.len(), "loaded rows");
	Ok(rows)
}

/// Write rows to a CSV file, creating parent directories as needed. The
/// column set is the union of all row columns, in first-seen order across
/// the rows, so callers can append match columns without pre-declaring a
/// schema.
pub fn save_rows(rows: &[Row], path: &Path) -> Result<(), RowIoError> {
	let display = path.display().to_string();

	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)
			.map_err(|e| RowIoError::Write(display.clone(), e.to_string()))?;
	}

	let mut columns: Vec<String> = Vec::new();
	for row in rows {
		for column in row.columns() {
			if !columns.iter().any(|c| c == column) {
				columns.push(column.to_string());
			}
		}
	}

	let mut writer = csv::Writer::from_path(path)
		.map_err(|e| RowIoError::Write(display.clone(), e.to_string()))?;

	writer
		.write_record(&columns)
		.map_err(|e| RowIoError::Write(display.clone(), e.to_string()))?;

	for row in rows {
		let record: Vec<String> = columns.iter().map(|c| row.get_str(c)).collect();
		writer
			.write_record(&record)
			.map_err(|e| RowIoError::Write(display.clone(), e.to_string()))?;
	}

	writer
		.flush()
		.map_err(|e| RowIoError::Write(display.clone(), e.to_string()))?;

	if rows.is_empty() {
		warn!(file = %display, "wrote an empty output file");
	}

	Ok(())
}

/// Validate that `row_columns` contains every entry in `required`, returning
/// the full list of missing columns (not just the first) so the caller can
/// report a complete schema error.
pub fn missing_required_columns<'a>(
	available: impl Iterator<Item = &'a str>,
	required: &[&str],
) -> Vec<String> {
	let available: Vec<&str> = available.collect();
	required
		.iter()
		.filter(|col| !available.contains(col))
		.map(|col| col.to_string())
		.collect()
}
