use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// Reads plan names from `column` of a CSV file.
///
/// Blank cells are skipped; at most `limit` names are returned.
pub fn read_entity_names(path: &Path, column: &str, limit: Option<usize>) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    let index = headers
        .iter()
        .position(|header| clean_header(header) == column)
        .ok_or_else(|| {
            let available: Vec<&str> = headers.iter().map(clean_header).collect();
            anyhow!(
                "column {column:?} not found in {}; available columns: {}",
                path.display(),
                available.join(", ")
            )
        })?;

    let mut names = Vec::new();
    for (line, record) in reader.records().enumerate() {
        if limit.is_some_and(|limit| names.len() >= limit) {
            break;
        }
        let record = record.with_context(|| format!("reading record {}", line + 1))?;
        let Some(name) = record.get(index).map(str::trim) else {
            continue;
        };
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

fn clean_header(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}
