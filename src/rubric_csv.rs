use std::path::Path;

use tracing::warn;

use crate::error::Result;

/// Flattens the rubric CSV column by column (header first, then its values)
/// into at most `expected_count` criterion labels. Unreadable files give no labels.
pub fn load_criterion_labels(csv_path: &Path, expected_count: usize) -> Vec<String> {
    match read_labels(csv_path, expected_count) {
        Ok(labels) => labels,
        Err(e) => {
            warn!("Ignoring rubric CSV {}: {}", csv_path.display(), e);
            Vec::new()
        }
    }
}

fn read_labels(csv_path: &Path, expected_count: usize) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)?;

    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;

    let mut labels = Vec::new();
    for (col, header) in headers.iter().enumerate() {
        if labels.len() >= expected_count {
            break;
        }
        push_label(&mut labels, header);
        for record in records.iter() {
            if labels.len() >= expected_count {
                break;
            }
            if let Some(value) = record.get(col) {
                push_label(&mut labels, value);
            }
        }
    }
    labels.truncate(expected_count);
    Ok(labels)
}

fn push_label(labels: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        labels.push(text.to_string());
    }
}
