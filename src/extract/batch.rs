//! Batch extraction coordinator.
//!
//! Drives the single-file extractor over an ordered file list, strictly
//! sequentially so that at most one decode buffer is live at a time and the
//! aggregate ordering is deterministic. Per-file failures are isolated: a
//! failing file contributes no text and one warning, and the rest of the
//! batch still runs.

use tracing::{info, warn};

use super::{ExtractionError, TextExtractor};
use crate::models::UploadedFile;

/// Warning produced for one file that failed extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct FileWarning {
    pub file_name: String,
    pub cause: String,
}

impl FileWarning {
    pub fn message(&self) -> String {
        format!("Error processing {}: {}", self.file_name, self.cause)
    }
}

/// Result of one extraction batch. `text` may be empty when every file
/// failed; the caller is responsible for rejecting an empty aggregation
/// before handing it to the gateway.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub text: String,
    pub warnings: Vec<FileWarning>,
}

/// Runs the extractor over `files` in order, reporting fractional progress
/// after each file. The progress sequence is non-decreasing and reaches
/// exactly 1.0 after the last file, regardless of how many files failed.
///
/// The input is assumed to be admission-filtered already: only image and PDF
/// kinds reach this point.
pub async fn run_batch<E, F>(extractor: &E, files: &[UploadedFile], mut on_progress: F) -> BatchOutcome
where
    E: TextExtractor + ?Sized,
    F: FnMut(f64),
{
    let total = files.len();
    let mut outcome = BatchOutcome::default();

    for (index, file) in files.iter().enumerate() {
        match extractor.extract(file).await {
            Ok(text) => {
                outcome.text.push_str(&text);
                outcome.text.push_str("\n\n");
            }
            Err(e) => {
                warn!("Extraction failed for {}: {}", file.name, e);
                outcome.warnings.push(file_warning(file, &e));
            }
        }
        on_progress((index + 1) as f64 / total as f64);
    }

    info!(
        "Extraction batch complete: {} files, {} failed, {} characters aggregated",
        total,
        outcome.warnings.len(),
        outcome.text.len()
    );
    outcome
}

fn file_warning(file: &UploadedFile, error: &ExtractionError) -> FileWarning {
    FileWarning {
        file_name: file.name.clone(),
        cause: error.to_string(),
    }
}
