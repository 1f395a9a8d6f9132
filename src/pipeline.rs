// pipeline.rs — Loader → Composer → Generator → Validator → Writer.
//
// Everything that can abort the run is checked before the first artifact is
// opened, so existing non-empty outputs are always a consistent pair.

use std::path::PathBuf;

use crate::config;
use crate::embeddings::text_prep::compose_texts;
use crate::embeddings::Embedder;
use crate::error::PipelineError;
use crate::output::{self, NormalizedRecord, RunSummary};
use crate::records;
use crate::validate::{self, DimensionCheck};

/// Paths and knobs for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub records_output_path: PathBuf,
    pub embeddings_output_path: PathBuf,
    pub expected_dims: usize,
    pub delimiter: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(config::pipeline::DEFAULT_INPUT_PATH),
            records_output_path: PathBuf::from(config::pipeline::DEFAULT_RECORDS_OUTPUT_PATH),
            embeddings_output_path: PathBuf::from(config::pipeline::DEFAULT_EMBEDDINGS_OUTPUT_PATH),
            expected_dims: config::embedding::EMBEDDING_DIMS,
            delimiter: config::pipeline::DEFAULT_DELIMITER as u8,
        }
    }
}

/// Loaded, normalized records and their embedding inputs, ready for inference.
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    pub records: Vec<NormalizedRecord>,
    pub texts: Vec<String>,
}

/// Load the source, check its schema, normalize, and compose embedding text.
///
/// Needs no model, so schema problems surface before any model download.
pub fn prepare(cfg: &PipelineConfig) -> Result<PreparedBatch, PipelineError> {
    let table = records::load_source_table(&cfg.input_path, cfg.delimiter)?;

    log::info!("Creating combined text for embeddings...");
    let texts = compose_texts(&table.records);
    let records = output::normalize_records(&table.records);

    Ok(PreparedBatch { records, texts })
}

impl PreparedBatch {
    /// Embed every text in one batch call, check width, write both artifacts.
    pub fn embed_and_write(
        self,
        embedder: &dyn Embedder,
        cfg: &PipelineConfig,
    ) -> Result<RunSummary, PipelineError> {
        log::info!(
            "Generating {}-dim embeddings for {} texts...",
            embedder.dimensions(),
            self.texts.len()
        );
        let embeddings = if self.texts.is_empty() {
            Vec::new()
        } else {
            embedder
                .embed_batch(&self.texts)
                .map_err(PipelineError::InferenceFailure)?
        };

        if embeddings.len() != self.records.len() {
            return Err(PipelineError::InferenceFailure(anyhow::anyhow!(
                "embedder returned {} vectors for {} texts",
                embeddings.len(),
                self.records.len()
            )));
        }

        if let DimensionCheck::Mismatch { actual, expected } =
            validate::check_dimensions(&embeddings, cfg.expected_dims)
        {
            log::info!(
                "Continuing with {actual}-dim embeddings; downstream consumers expect {expected}"
            );
        }

        output::write_artifacts(
            &self.records,
            &embeddings,
            &cfg.records_output_path,
            &cfg.embeddings_output_path,
        )
    }
}

/// Full run with an already-constructed embedder.
pub fn run(cfg: &PipelineConfig, embedder: &dyn Embedder) -> Result<RunSummary, PipelineError> {
    prepare(cfg)?.embed_and_write(embedder, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;

    /// Deterministic stand-in: vector = [len(text), 0, 0, ...].
    struct StubEmbedder {
        dims: usize,
        calls: Cell<usize>,
    }

    impl StubEmbedder {
        fn new(dims: usize) -> Self {
            Self { dims, calls: Cell::new(0) }
        }
    }

    impl Embedder for StubEmbedder {
        fn dimensions(&self) -> usize {
            self.dims
        }

        fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            self.calls.set(self.calls.get() + 1);
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; self.dims];
                    if let Some(first) = v.first_mut() {
                        *first = t.len() as f32;
                    }
                    v
                })
                .collect())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn dimensions(&self) -> usize {
            384
        }

        fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            anyhow::bail!("model exploded")
        }
    }

    struct ShortEmbedder;

    impl Embedder for ShortEmbedder {
        fn dimensions(&self) -> usize {
            384
        }

        fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(vec![vec![0.0; 384]])
        }
    }

    fn setup(csv: &str) -> (tempfile::TempDir, PipelineConfig) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("people.csv");
        fs::write(&input, csv).unwrap();
        let cfg = PipelineConfig {
            input_path: input,
            records_output_path: dir.path().join("people_with_index.json"),
            embeddings_output_path: dir.path().join("embeddings.json"),
            ..Default::default()
        };
        (dir, cfg)
    }

    #[test]
    fn test_single_row_run() {
        let (_dir, cfg) = setup("ID,Bio,Category\n1,Hi,X\n");
        let embedder = StubEmbedder::new(384);
        let summary = run(&cfg, &embedder).unwrap();
        assert_eq!(summary.records_processed, 1);
        assert_eq!(summary.embeddings_generated, 1);
        assert_eq!(embedder.calls.get(), 1);

        let emb: Vec<Vec<f32>> =
            serde_json::from_str(&fs::read_to_string(&cfg.embeddings_output_path).unwrap()).unwrap();
        assert_eq!(emb.len(), 1);
        assert_eq!(emb[0].len(), 384);
        // "Hi X"
        assert_eq!(emb[0][0], 4.0);

        let recs: Vec<NormalizedRecord> =
            serde_json::from_str(&fs::read_to_string(&cfg.records_output_path).unwrap()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].embedding_index, 0);
        assert_eq!(recs[0].resume_html, "");
    }

    #[test]
    fn test_one_batch_call_for_many_rows() {
        let mut csv = String::from("ID,Bio,Category\n");
        for i in 0..250 {
            csv.push_str(&format!("{i},bio {i},cat\n"));
        }
        let (_dir, cfg) = setup(&csv);
        let embedder = StubEmbedder::new(8);
        let summary = run(&cfg, &embedder).unwrap();
        assert_eq!(summary.records_processed, 250);
        assert_eq!(embedder.calls.get(), 1);
    }

    #[test]
    fn test_empty_table_skips_inference() {
        let (_dir, cfg) = setup("ID,Bio,Category,Resume_html\n");
        let embedder = StubEmbedder::new(384);
        let summary = run(&cfg, &embedder).unwrap();
        assert_eq!(summary.records_processed, 0);
        assert_eq!(embedder.calls.get(), 0);
        assert_eq!(fs::read_to_string(&cfg.records_output_path).unwrap(), "[]");
        assert_eq!(fs::read_to_string(&cfg.embeddings_output_path).unwrap(), "[]");
    }

    #[test]
    fn test_dimension_mismatch_still_writes() {
        let (_dir, cfg) = setup("ID,Bio,Category\n1,Hi,X\n");
        let summary = run(&cfg, &StubEmbedder::new(16)).unwrap();
        assert_eq!(summary.embeddings_generated, 1);
        assert!(cfg.embeddings_output_path.exists());
    }

    #[test]
    fn test_inference_failure_writes_nothing() {
        let (_dir, cfg) = setup("ID,Bio,Category\n1,Hi,X\n");
        let err = run(&cfg, &FailingEmbedder).unwrap_err();
        assert!(matches!(err, PipelineError::InferenceFailure(_)));
        assert!(err.to_string().contains("model exploded"));
        assert!(!cfg.records_output_path.exists());
        assert!(!cfg.embeddings_output_path.exists());
    }

    #[test]
    fn test_vector_count_mismatch_is_inference_failure() {
        let (_dir, cfg) = setup("ID,Bio,Category\n1,a,b\n2,c,d\n");
        let err = run(&cfg, &ShortEmbedder).unwrap_err();
        assert!(matches!(err, PipelineError::InferenceFailure(_)));
        assert!(!cfg.records_output_path.exists());
    }

    #[test]
    fn test_schema_error_leaves_existing_outputs_untouched() {
        let (_dir, cfg) = setup("ID,Bio\n1,Hi\n");
        fs::write(&cfg.records_output_path, "old").unwrap();
        let err = run(&cfg, &StubEmbedder::new(384)).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaInvalid { .. }));
        assert_eq!(fs::read_to_string(&cfg.records_output_path).unwrap(), "old");
        assert!(!cfg.embeddings_output_path.exists());
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let (_dir, cfg) = setup("ID,Bio,Category,Resume_html\n1,Ünïcode,X,<p>r</p>\n2,,NaN,\n");
        let embedder = StubEmbedder::new(4);
        run(&cfg, &embedder).unwrap();
        let first = (
            fs::read(&cfg.records_output_path).unwrap(),
            fs::read(&cfg.embeddings_output_path).unwrap(),
        );
        run(&cfg, &embedder).unwrap();
        let second = (
            fs::read(&cfg.records_output_path).unwrap(),
            fs::read(&cfg.embeddings_output_path).unwrap(),
        );
        assert_eq!(first, second);
    }
}
