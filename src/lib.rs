//! Batch job turning a people table into two position-aligned artifacts:
//! normalized records (`people_with_index.json`) and their sentence
//! embeddings (`embeddings.json`).

pub mod config;
pub mod embeddings;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod validate;

pub use embeddings::Embedder;
pub use error::PipelineError;
pub use output::{NormalizedRecord, RunSummary};
pub use pipeline::{prepare, run, PipelineConfig, PreparedBatch};
