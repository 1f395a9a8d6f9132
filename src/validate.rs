// validate.rs — Embedding width check.
//
// Only the first vector is inspected; a mismatch is logged and the run goes on
// so a model/version drift shows up without throwing away the batch.

/// Result of the width check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionCheck {
    /// No vectors were produced; nothing to check.
    Skipped,
    Ok { dims: usize },
    Mismatch { actual: usize, expected: usize },
}

pub fn check_dimensions(embeddings: &[Vec<f32>], expected: usize) -> DimensionCheck {
    let Some(first) = embeddings.first() else {
        log::debug!("No embeddings produced, skipping dimension check");
        return DimensionCheck::Skipped;
    };

    let actual = first.len();
    if actual != expected {
        log::warn!(
            "Embedding dimension is {}, expected {} (model/version mismatch?)",
            actual,
            expected
        );
        DimensionCheck::Mismatch { actual, expected }
    } else {
        log::info!("Embeddings have expected dimension: {}", expected);
        DimensionCheck::Ok { dims: actual }
    }
}
