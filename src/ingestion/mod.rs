
mod html;
mod issues;
mod pdf;
mod spreadsheet;
mod text;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{CasegenError, Result};

/// A unit of text extracted from an artifact before chunking.
///
/// Records are immutable; metadata is extended through [`with_metadata`],
/// never mutated in place. Identity is assigned later, at chunk granularity.
///
/// [`with_metadata`]: ArtifactRecord::with_metadata
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtifactRecord {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl ArtifactRecord {
    #[inline]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Return a copy of this record with additional metadata merged in.
    /// Existing keys are overwritten by the new values.
    #[inline]
    #[must_use]
    pub fn with_metadata<I, K, V>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut metadata = self.metadata.clone();
        metadata.extend(extra.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self {
            text: self.text.clone(),
            metadata,
        }
    }
}

/// Format adapters, dispatched on the normalized file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    Pdf,
    Html,
    Issues,
    Spreadsheet,
    Text,
}

impl Adapter {
    /// Select an adapter for the given path, matching the extension
    /// case-insensitively. Returns `None` for unsupported formats.
    #[inline]
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Issues),
            "csv" | "xlsx" | "xlsm" => Some(Self::Spreadsheet),
            "txt" | "md" | "markdown" => Some(Self::Text),
            _ => None,
        }
    }

    /// The `doc_type` tag stamped on every record this adapter produces.
    #[inline]
    pub fn doc_type(self, path: &Path) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Issues => "jira",
            Self::Spreadsheet => "spreadsheet",
            Self::Text => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_ascii_lowercase);
                match ext.as_deref() {
                    Some("md" | "markdown") => "markdown",
                    _ => "text",
                }
            }
        }
    }

    fn extract(self, path: &Path) -> Result<Vec<ArtifactRecord>> {
        match self {
            Self::Pdf => pdf::load(path),
            Self::Html => html::load(path),
            Self::Issues => issues::load(path),
            Self::Spreadsheet => spreadsheet::load(path),
            Self::Text => text::load(path),
        }
    }
}

/// Load an artifact into records, tagging each with `source` and `doc_type`
/// provenance. Fails with [`CasegenError::UnsupportedFormat`] when no adapter
/// matches the extension.
#[inline]
pub fn load_artifact(path: &Path) -> Result<Vec<ArtifactRecord>> {
    let adapter =
        Adapter::for_path(path).ok_or_else(|| CasegenError::UnsupportedFormat(path.to_path_buf()))?;

    debug!("Loading {} with {:?} adapter", path.display(), adapter);
    let records = adapter.extract(path)?;

    let doc_type = adapter.doc_type(path);
    let source = path.to_string_lossy().into_owned();
    let tagged = records
        .into_iter()
        .map(|record| {
            let mut extra = vec![("doc_type".to_string(), doc_type.to_string())];
            if !record.metadata.contains_key("source") {
                extra.push(("source".to_string(), source.clone()));
            }
            record.with_metadata(extra)
        })
        .collect();

    Ok(tagged)
}

/// Discover ingestable artifacts beneath the given paths. Directories are
/// walked recursively; files with unsupported extensions are skipped. The
/// result is sorted and deduplicated.
#[inline]
pub fn discover_artifacts(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_from_dir(path, &mut resolved)?;
        } else if Adapter::for_path(path).is_some() {
            resolved.push(path.clone());
        } else {
            warn!("Skipping unsupported artifact: {}", path.display());
        }
    }
    resolved.sort();
    resolved.dedup();
    Ok(resolved)
}

fn collect_from_dir(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_from_dir(&path, out)?;
        } else if Adapter::for_path(&path).is_some() {
            out.push(path);
        }
    }
    Ok(())
}
