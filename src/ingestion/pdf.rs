use std::path::Path;

use lopdf::Document;
use tracing::warn;

use super::ArtifactRecord;
use crate::{CasegenError, Result};

/// Extract text from a PDF page by page. Each non-blank page becomes one
/// record tagged with its 1-based page number. Pages that fail text
/// extraction are skipped rather than failing the whole artifact.
pub(crate) fn load(path: &Path) -> Result<Vec<ArtifactRecord>> {
    let document = Document::load(path).map_err(|e| {
        CasegenError::Extraction(format!("Failed to read PDF {}: {e}", path.display()))
    })?;

    let mut records = Vec::new();
    for page_number in document.get_pages().keys() {
        let text = match document.extract_text(&[*page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Skipping page {} of {}: {e}",
                    page_number,
                    path.display()
                );
                continue;
            }
        };

        if text.trim().is_empty() {
            continue;
        }

        records.push(
            ArtifactRecord::new(text).with_metadata([("page", page_number.to_string())]),
        );
    }

    Ok(records)
}
