use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use itertools::Itertools;

use super::ArtifactRecord;
use crate::{CasegenError, Result};

/// Extract spreadsheet rows as plain text records. CSV rows are mapped
/// against the header row; XLSX/XLSM sheets treat their first row as
/// headers and tag each record with the sheet name.
pub(crate) fn load(path: &Path) -> Result<Vec<ArtifactRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => load_csv(path),
        Some("xlsx" | "xlsm") => load_workbook(path),
        _ => Err(CasegenError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn load_csv(path: &Path) -> Result<Vec<ArtifactRecord>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        CasegenError::Extraction(format!("Failed to read CSV {}: {e}", path.display()))
    })?;
    let headers = reader
        .headers()
        .map_err(|e| {
            CasegenError::Extraction(format!("Failed to read CSV headers {}: {e}", path.display()))
        })?
        .clone();

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            CasegenError::Extraction(format!("Malformed CSV row in {}: {e}", path.display()))
        })?;
        let text = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| format!("{header}: {value}"))
            .join(" | ");

        records.push(
            ArtifactRecord::new(text).with_metadata([("row", (index + 1).to_string())]),
        );
    }

    Ok(records)
}

fn load_workbook(path: &Path) -> Result<Vec<ArtifactRecord>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        CasegenError::Extraction(format!("Failed to open workbook {}: {e}", path.display()))
    })?;

    let mut records = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            CasegenError::Extraction(format!(
                "Failed to read sheet '{sheet_name}' in {}: {e}",
                path.display()
            ))
        })?;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            continue;
        };
        let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

        // Data rows start at spreadsheet row 2, matching what a user sees.
        for (offset, row) in rows.enumerate() {
            let text = headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| format!("{header}: {}", cell_to_string(cell)))
                .join(" | ");

            records.push(ArtifactRecord::new(text).with_metadata([
                ("sheet", sheet_name.clone()),
                ("row", (offset + 2).to_string()),
            ]));
        }
    }

    Ok(records)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
