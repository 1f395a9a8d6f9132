// records.rs — Source table loading, schema check, and missing-value normalization.
//
// The source is a delimited text table with a header row. Required columns are
// checked before any row is read; every cell that is empty or a null marker is
// replaced with "" across all columns.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::config::pipeline as cfg;
use crate::error::PipelineError;

/// One row of the source table after missing-value normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub id: String,
    pub bio: String,
    pub category: String,
    /// `None` when the source has no `Resume_html` column at all.
    pub resume_html: Option<String>,
}

/// The loaded table: original column set plus rows in file order.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub columns: Vec<String>,
    pub records: Vec<SourceRecord>,
}

/// Load and normalize the source table at `path`.
pub fn load_source_table(path: &Path, delimiter: u8) -> Result<SourceTable, PipelineError> {
    if path.is_dir() {
        return Err(PipelineError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(PipelineError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(PipelineError::unreadable(path, e)),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::unreadable(path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if columns.is_empty() {
        return Err(PipelineError::unreadable(path, "no columns to parse from file"));
    }

    check_required_columns(&columns)?;

    let id_idx = column_index(&columns, cfg::COL_ID);
    let bio_idx = column_index(&columns, cfg::COL_BIO);
    let category_idx = column_index(&columns, cfg::COL_CATEGORY);
    let resume_idx = columns.iter().position(|c| c == cfg::COL_RESUME_HTML);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| PipelineError::unreadable(path, e))?;
        if row.len() > columns.len() {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            return Err(PipelineError::unreadable(
                path,
                format!(
                    "line {line}: expected {} fields, saw {}",
                    columns.len(),
                    row.len()
                ),
            ));
        }

        // Short rows are padded with missing cells.
        let mut cells: Vec<String> = (0..columns.len())
            .map(|i| normalize_cell(row.get(i)))
            .collect();

        records.push(SourceRecord {
            id: std::mem::take(&mut cells[id_idx]),
            bio: std::mem::take(&mut cells[bio_idx]),
            category: std::mem::take(&mut cells[category_idx]),
            resume_html: resume_idx.map(|i| std::mem::take(&mut cells[i])),
        });

        if records.len() % cfg::LOAD_PROGRESS_EVERY == 0 {
            log::debug!("Loaded {} records...", records.len());
        }
    }

    log::info!(
        "Loaded {} records from {} (columns: {:?})",
        records.len(),
        path.display(),
        columns
    );

    Ok(SourceTable { columns, records })
}

/// Fails with `SchemaInvalid` naming every absent required column.
pub fn check_required_columns(columns: &[String]) -> Result<(), PipelineError> {
    let missing: Vec<String> = cfg::REQUIRED_COLUMNS
        .iter()
        .filter(|req| !columns.iter().any(|c| c == *req))
        .map(|req| req.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::SchemaInvalid {
            missing,
            available: columns.to_vec(),
        })
    }
}

/// Map an absent, empty, or null-marker cell to "".
pub fn normalize_cell(cell: Option<&str>) -> String {
    match cell {
        Some(v) if !v.is_empty() && !cfg::NULL_MARKERS.contains(&v) => v.to_string(),
        _ => String::new(),
    }
}

/// Validate a delimiter character and return it as the byte the reader uses.
///
/// Quotes and line terminators would silently change how rows are split.
pub fn delimiter_byte(delimiter: char) -> anyhow::Result<u8> {
    if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
        anyhow::bail!(
            "delimiter must be a single ASCII character other than a quote or line break, got {:?}",
            delimiter
        );
    }
    Ok(delimiter as u8)
}

fn column_index(columns: &[String], name: &str) -> usize {
    // Callers run check_required_columns first.
    columns.iter().position(|c| c == name).unwrap_or_default()
}
