//! Output formatting

use anyhow::Result;
use folio_core::{ContentRecord, Document};
use serde::Serialize;
use serde_json::Value;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per record: path, then title when present
pub fn record_line(record: &ContentRecord) -> String {
    match record.title() {
        Some(title) => format!("{}\t{}", record.path(), title),
        None => record.path().to_string(),
    }
}

/// `key: value` lines; nested entities are printed as compact JSON
pub fn document_lines(doc: &Document) -> Vec<String> {
    let width = doc.keys().map(|k| k.len()).max().unwrap_or(0);
    doc.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{:width$}  {}", key, rendered, width = width)
        })
        .collect()
}
