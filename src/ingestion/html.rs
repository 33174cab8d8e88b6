use std::fs;
use std::path::Path;

use scraper::{Html, Node};

use super::ArtifactRecord;
use crate::Result;

/// Extract cleaned text from an HTML page. Script and style contents are
/// dropped; remaining text nodes are joined line-wise.
pub(crate) fn load(path: &Path) -> Result<Vec<ArtifactRecord>> {
    let html = fs::read_to_string(path)?;
    let document = Html::parse_document(&html);

    let mut lines = Vec::new();
    for node in document.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let in_ignored_element = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => matches!(element.name(), "script" | "style"),
            _ => false,
        });
        if in_ignored_element {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    Ok(vec![
        ArtifactRecord::new(lines.join("\n")).with_metadata([("section", "body")]),
    ])
}
