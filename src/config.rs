// IMPORTANT:
// Keep ALL numeric values and default paths centralized here.

// NOTE: VERSION must stay in sync with the `version` field in Cargo.toml.
pub const VERSION: &str = "0.1.0";

pub mod pipeline {
    pub const DEFAULT_INPUT_PATH: &str = "people_data.csv";
    pub const DEFAULT_RECORDS_OUTPUT_PATH: &str = "people_with_index.json";
    pub const DEFAULT_EMBEDDINGS_OUTPUT_PATH: &str = "embeddings.json";

    pub const COL_ID: &str = "ID";
    pub const COL_BIO: &str = "Bio";
    pub const COL_CATEGORY: &str = "Category";
    pub const COL_RESUME_HTML: &str = "Resume_html";

    /// Columns whose absence aborts the run.
    pub const REQUIRED_COLUMNS: [&str; 3] = [COL_ID, COL_BIO, COL_CATEGORY];

    /// Cell values treated as missing (in addition to the empty string).
    /// Same marker set the usual dataframe readers recognize by default.
    pub const NULL_MARKERS: &[&str] = &[
        "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
        "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
    ];

    pub const DEFAULT_DELIMITER: char = ',';

    // Log a loader heartbeat every N rows.
    pub const LOAD_PROGRESS_EVERY: usize = 100;
}

pub mod logging {
    pub const LOG_DIR_REL: &str = ".people-embed/logs";
    pub const LOG_FILE_NAME: &str = "people_embed";

    pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
    pub const LOG_ROTATE_KEEP_FILES: usize = 5;
}

pub mod download {
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 90;
}

pub mod embedding {
    pub const EMBEDDING_DIMS: usize = 384;
    pub const EMBEDDING_MODEL_NAME: &str = "all-MiniLM-L6-v2";

    // Max word-piece tokens for all-MiniLM-L6-v2 (model context limit is 256).
    pub const MAX_TOKENS: usize = 256;

    // Sub-batch size for one forward pass.
    pub const DEFAULT_BATCH_SIZE: usize = 32;

    pub const MODEL_BASE_URL: &str =
        "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

    // SHA256 hashes for integrity verification
    pub const MODEL_SAFETENSORS_SHA256: &str =
        "53aa51172d142c89d9012cce15ae4d6cc0ca6895895114379cacb4fab128d9db";
    pub const TOKENIZER_JSON_SHA256: &str =
        "be50c3628f2bf5bb5e3a7f17b1f74611b2561a3a27eeab05e5aa30f411572037";
    pub const CONFIG_JSON_SHA256: &str =
        "953f9c0d463486b10a6871cc2fd59f223b2c70184f49815e7efbcab5d8908b41";

    // Local model storage directory (relative to home)
    pub const MODEL_DIR_REL: &str = ".people-embed/models/all-MiniLM-L6-v2";
}
