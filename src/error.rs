use std::path::PathBuf;

/// Fatal pipeline failures. Every variant except `OutputWrite` is raised
/// before either artifact is touched.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("source table not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to read source table {}: {cause}", path.display())]
    SourceUnreadable { path: PathBuf, cause: String },

    #[error("missing required columns: {missing:?} (available columns: {available:?})")]
    SchemaInvalid {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("embedding inference failed: {0:#}")]
    InferenceFailure(anyhow::Error),

    #[error("failed to write {}: {cause}", path.display())]
    OutputWrite { path: PathBuf, cause: String },
}

impl PipelineError {
    pub(crate) fn unreadable(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        Self::SourceUnreadable {
            path: path.to_path_buf(),
            cause: cause.to_string(),
        }
    }

    pub(crate) fn output(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        Self::OutputWrite {
            path: path.to_path_buf(),
            cause: cause.to_string(),
        }
    }
}
