use std::fs;
use std::path::Path;

use super::ArtifactRecord;
use crate::Result;

/// Load a UTF-8 text or Markdown file as a single record. Invalid byte
/// sequences are replaced rather than failing the artifact.
pub(crate) fn load(path: &Path) -> Result<Vec<ArtifactRecord>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    Ok(vec![
        ArtifactRecord::new(text).with_metadata([("section", "full_text")]),
    ])
}
