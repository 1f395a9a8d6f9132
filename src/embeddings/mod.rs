// embeddings/ — Local sentence embedding engine using candle (pure Rust).
//
// Provides:
// - Model download + SHA256 verification
// - BERT batch inference with mean pooling
// - Text preparation for person records

pub mod download;
pub mod engine;
pub mod text_prep;

/// Anything that turns a batch of texts into fixed-width vectors.
///
/// Implementations must return exactly one vector per input, in input order.
/// Re-running on identical input is only reproducible when the implementation
/// is deterministic; the candle engine is (CPU, no dropout).
pub trait Embedder {
    /// Width of the vectors this embedder is expected to produce.
    fn dimensions(&self) -> usize;

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Stand-in used when there is nothing to embed, so no model is loaded.
///
/// Errors if it is ever handed a non-empty batch.
#[derive(Debug, Clone, Copy)]
pub struct NoInference {
    dims: usize,
}

impl NoInference {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

impl Embedder for NoInference {
    fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if !texts.is_empty() {
            anyhow::bail!("no embedding model loaded for {} texts", texts.len());
        }
        Ok(Vec::new())
    }
}
