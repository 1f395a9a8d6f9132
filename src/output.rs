// output.rs — Record and embedding artifacts.
//
// Two JSON files, aligned by position: records[i].embedding_index == i and
// embeddings[i] is that record's vector. Both are overwritten on every run.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::records::SourceRecord;

/// One entry of the record artifact. Field order is part of the file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Bio")]
    pub bio: String,
    #[serde(rename = "Resume_html")]
    pub resume_html: String,
    #[serde(rename = "Category")]
    pub category: String,
    pub embedding_index: usize,
}

impl NormalizedRecord {
    pub fn from_source(embedding_index: usize, src: &SourceRecord) -> Self {
        Self {
            id: src.id.clone(),
            bio: src.bio.clone(),
            resume_html: src.resume_html.clone().unwrap_or_default(),
            category: src.category.clone(),
            embedding_index,
        }
    }
}

/// Number the records 0..n in source order.
pub fn normalize_records(records: &[SourceRecord]) -> Vec<NormalizedRecord> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| NormalizedRecord::from_source(i, r))
        .collect()
}

/// Counts and paths reported after a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub records_processed: usize,
    pub embeddings_generated: usize,
    pub records_path: PathBuf,
    pub embeddings_path: PathBuf,
}

/// Write both artifacts. Callers guarantee `records.len() == embeddings.len()`.
pub fn write_artifacts(
    records: &[NormalizedRecord],
    embeddings: &[Vec<f32>],
    records_path: &Path,
    embeddings_path: &Path,
) -> Result<RunSummary, PipelineError> {
    debug_assert_eq!(records.len(), embeddings.len());

    write_json_pretty(records_path, records)?;
    log::info!("Saved {} records to {}", records.len(), records_path.display());

    write_json_pretty(embeddings_path, embeddings)?;
    log::info!(
        "Saved {} embeddings to {}",
        embeddings.len(),
        embeddings_path.display()
    );

    Ok(RunSummary {
        records_processed: records.len(),
        embeddings_generated: embeddings.len(),
        records_path: records_path.to_path_buf(),
        embeddings_path: embeddings_path.to_path_buf(),
    })
}

/// Two-space indented JSON; serde_json leaves non-ASCII unescaped.
fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::output(path, e))?;
    }

    let file = File::create(path).map_err(|e| PipelineError::output(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| PipelineError::output(path, e))?;
    writer.flush().map_err(|e| PipelineError::output(path, e))?;
    Ok(())
}
