use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::ArtifactRecord;
use crate::Result;

#[derive(Debug, Default, Deserialize)]
struct IssueExport {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    key: Option<String>,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Debug, Default, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: String,
    description: Option<String>,
    status: Option<Named>,
    assignee: Option<Assignee>,
    issuetype: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Assignee {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

/// Parse a Jira issue export into one record per issue. Both the raw array
/// form and the `{"issues": [...]}` wrapper are accepted; an export without
/// an `issues` key yields zero records.
pub(crate) fn load(path: &Path) -> Result<Vec<ArtifactRecord>> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let issues: Vec<Issue> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        serde_json::from_value::<IssueExport>(value)?.issues
    };

    let records = issues
        .into_iter()
        .map(|issue| {
            let summary = issue.fields.summary;
            let description = issue.fields.description.unwrap_or_default();
            let text = format!("Summary: {summary}\nDescription: {description}")
                .trim()
                .to_string();

            let metadata = [
                ("issue_key", issue.key.unwrap_or_default()),
                (
                    "status",
                    issue.fields.status.and_then(|s| s.name).unwrap_or_default(),
                ),
                (
                    "assignee",
                    issue
                        .fields
                        .assignee
                        .and_then(|a| a.display_name)
                        .unwrap_or_default(),
                ),
                (
                    "issue_type",
                    issue
                        .fields
                        .issuetype
                        .and_then(|t| t.name)
                        .unwrap_or_default(),
                ),
            ]
            .into_iter()
            .filter(|(_, value)| !value.is_empty());

            ArtifactRecord::new(text).with_metadata(metadata)
        })
        .collect();

    Ok(records)
}
