//! End-to-end runs through the library with a deterministic stub embedder.

use std::fs;

use people_embed::{run, Embedder, NormalizedRecord, PipelineConfig};
use tempfile::TempDir;

/// Hashes each text into a small fixed-width vector.
struct HashEmbedder {
    dims: usize,
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0f32; self.dims];
                for (i, b) in t.bytes().enumerate() {
                    v[i % self.dims] += b as f32;
                }
                v
            })
            .collect())
    }
}

fn config_in(dir: &TempDir, csv: &str) -> PipelineConfig {
    let input = dir.path().join("people_data.csv");
    fs::write(&input, csv).unwrap();
    PipelineConfig {
        input_path: input,
        records_output_path: dir.path().join("people_with_index.json"),
        embeddings_output_path: dir.path().join("embeddings.json"),
        ..Default::default()
    }
}

fn read_outputs(cfg: &PipelineConfig) -> (Vec<NormalizedRecord>, Vec<Vec<f32>>) {
    let records = serde_json::from_str(&fs::read_to_string(&cfg.records_output_path).unwrap()).unwrap();
    let embeddings = serde_json::from_str(&fs::read_to_string(&cfg.embeddings_output_path).unwrap()).unwrap();
    (records, embeddings)
}

#[test]
fn records_and_embeddings_stay_aligned() {
    let dir = TempDir::new().unwrap();
    let cfg = config_in(
        &dir,
        "ID,Bio,Category,Resume_html,Extra\n\
         10,Engineer,Tech,<p>cv</p>,x\n\
         11,,Art,,\n\
         12,Chef,,NULL,y\n\
         13,\"Writes, edits\",Media,<i>r</i>,z\n",
    );
    let embedder = HashEmbedder { dims: 384 };
    let summary = run(&cfg, &embedder).unwrap();
    assert_eq!(summary.records_processed, 4);

    let (records, embeddings) = read_outputs(&cfg);
    assert_eq!(records.len(), embeddings.len());
    for (i, r) in records.iter().enumerate() {
        assert_eq!(r.embedding_index, i);
        let expected = embedder
            .embed_batch(&[format!("{} {}", r.bio, r.category)])
            .unwrap()
            .remove(0);
        assert_eq!(embeddings[i], expected, "row {i} vector out of place");
    }

    assert_eq!(records[0].id, "10");
    assert_eq!(records[1].bio, "");
    assert_eq!(records[2].category, "");
    assert_eq!(records[2].resume_html, "");
    assert_eq!(records[3].bio, "Writes, edits");
}

#[test]
fn absent_resume_column_becomes_empty_string() {
    let dir = TempDir::new().unwrap();
    let cfg = config_in(&dir, "ID,Bio,Category\n1,Hi,X\n");
    run(&cfg, &HashEmbedder { dims: 384 }).unwrap();

    let raw = fs::read_to_string(&cfg.records_output_path).unwrap();
    assert!(raw.contains("\"Resume_html\": \"\""));
    let (records, embeddings) = read_outputs(&cfg);
    assert_eq!(records[0].embedding_index, 0);
    assert_eq!(embeddings[0].len(), 384);
}

#[test]
fn empty_table_writes_empty_arrays() {
    let dir = TempDir::new().unwrap();
    let cfg = config_in(&dir, "ID,Bio,Category\n");
    let summary = run(&cfg, &HashEmbedder { dims: 384 }).unwrap();
    assert_eq!(summary.embeddings_generated, 0);
    assert_eq!(fs::read_to_string(&cfg.records_output_path).unwrap(), "[]");
    assert_eq!(fs::read_to_string(&cfg.embeddings_output_path).unwrap(), "[]");
}
