use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use people_embed::config;
use people_embed::embeddings::download;
use people_embed::embeddings::engine::EmbeddingEngine;
use people_embed::embeddings::NoInference;
use people_embed::{logging, pipeline, records, PipelineConfig, PipelineError};

#[derive(Parser, Debug)]
#[command(
    name = "generate_embeddings",
    version = config::VERSION,
    about = "Normalize a people CSV and generate one sentence embedding per record"
)]
struct Cli {
    /// Source table with at least ID, Bio and Category columns
    #[arg(long, env = "PEOPLE_EMBED_INPUT", default_value = config::pipeline::DEFAULT_INPUT_PATH)]
    input: PathBuf,

    /// Output JSON array of normalized records
    #[arg(
        long,
        env = "PEOPLE_EMBED_RECORDS_OUTPUT",
        default_value = config::pipeline::DEFAULT_RECORDS_OUTPUT_PATH
    )]
    records_output: PathBuf,

    /// Output JSON array of embedding vectors, aligned with the records by position
    #[arg(
        long,
        env = "PEOPLE_EMBED_EMBEDDINGS_OUTPUT",
        default_value = config::pipeline::DEFAULT_EMBEDDINGS_OUTPUT_PATH
    )]
    embeddings_output: PathBuf,

    /// Directory holding model.safetensors, tokenizer.json and config.json
    /// (downloaded on first use; defaults to ~/.people-embed/models/all-MiniLM-L6-v2)
    #[arg(long, env = "PEOPLE_EMBED_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Embedding width the downstream index expects
    #[arg(long, env = "PEOPLE_EMBED_EXPECTED_DIMS", default_value_t = config::embedding::EMBEDDING_DIMS)]
    expected_dims: usize,

    /// Texts per forward pass
    #[arg(long, env = "PEOPLE_EMBED_BATCH_SIZE", default_value_t = config::embedding::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Field delimiter of the source table (single ASCII character, not a quote or line break)
    #[arg(long, env = "PEOPLE_EMBED_DELIMITER", default_value_t = config::pipeline::DEFAULT_DELIMITER)]
    delimiter: char,

    /// Directory for rotating log files (defaults to ~/.people-embed/logs)
    #[arg(long, env = "PEOPLE_EMBED_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Only warnings and errors on stderr, no progress bar
    #[arg(long, short = 'q', env = "PEOPLE_EMBED_QUIET", default_value_t = false)]
    quiet: bool,
}

fn main() {
    if let Err(e) = real_main() {
        eprintln!("[people-embed] fatal error: {e:#}");
        log::error!("Fatal error: {:?}", e);
        std::process::exit(1);
    }
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _logger = logging::init_logging(cli.log_dir.as_deref(), cli.quiet)?;

    let delimiter = records::delimiter_byte(cli.delimiter)?;

    let cfg = PipelineConfig {
        input_path: cli.input,
        records_output_path: cli.records_output,
        embeddings_output_path: cli.embeddings_output,
        expected_dims: cli.expected_dims,
        delimiter,
    };

    // Schema problems abort here, before any model download.
    let batch = pipeline::prepare(&cfg)?;

    let summary = if batch.texts.is_empty() {
        log::info!("No records to embed, skipping model load");
        batch.embed_and_write(&NoInference::new(cfg.expected_dims), &cfg)?
    } else {
        let model_dir = match cli.model_dir {
            Some(dir) => dir,
            None => download::default_model_dir()?,
        };
        let engine = load_engine(&model_dir, cli.batch_size).map_err(PipelineError::InferenceFailure)?;
        let engine = if cli.quiet { engine.quiet() } else { engine };
        batch.embed_and_write(&engine, &cfg)?
    };

    println!("Processing complete!");
    println!("- Total records processed: {}", summary.records_processed);
    println!("- Embeddings generated: {}", summary.embeddings_generated);
    println!(
        "- Files created: {}, {}",
        summary.records_path.display(),
        summary.embeddings_path.display()
    );
    println!("Next: feed both files to the indexer; query embeddings must use the same model.");

    log::info!("Run finished: {:?}", summary);
    Ok(())
}

fn load_engine(model_dir: &std::path::Path, batch_size: usize) -> anyhow::Result<EmbeddingEngine> {
    let dir = download::ensure_model_files(model_dir)?;
    EmbeddingEngine::load(&dir, batch_size)
        .with_context(|| format!("load {} from {}", config::embedding::EMBEDDING_MODEL_NAME, dir.display()))
}
