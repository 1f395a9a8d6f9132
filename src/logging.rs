use std::path::{Path, PathBuf};

use anyhow::Context;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use crate::config;

/// File log at debug with rotation, stderr at info (or warn when `quiet`).
///
/// The returned handle must be kept alive for the duration of the run.
pub fn init_logging(log_dir: Option<&Path>, quiet: bool) -> anyhow::Result<LoggerHandle> {
    let log_dir = match log_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_log_dir()?,
    };
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed creating log dir {}", log_dir.display()))?;

    let stderr_level = if quiet { Duplicate::Warn } else { Duplicate::Info };

    let handle = Logger::try_with_str("debug")?
        .log_to_file(FileSpec::default().directory(&log_dir).basename(config::logging::LOG_FILE_NAME))
        .rotate(
            Criterion::Size(config::logging::LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config::logging::LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stderr(stderr_level)
        .format_for_files(flexi_logger::detailed_format)
        .format_for_stderr(flexi_logger::default_format)
        .start()
        .context("failed to start logger")?;

    log::debug!("{}", "=".repeat(60));
    log::debug!("people-embed starting");
    log::debug!("Version: {}", config::VERSION);
    log::debug!("Platform: {}", std::env::consts::OS);
    log::debug!("Log dir: {}", log_dir.display());
    log::debug!("{}", "=".repeat(60));

    Ok(handle)
}

fn default_log_dir() -> anyhow::Result<PathBuf> {
    let home = crate::embeddings::download::home_dir().context("cannot determine home directory for logs")?;
    Ok(home.join(config::logging::LOG_DIR_REL))
}
