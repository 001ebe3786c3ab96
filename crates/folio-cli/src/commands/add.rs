//! Add command

use crate::app::{AddArgs, OutputFormat};
use crate::library::Library;
use anyhow::{Context, Result};
use folio_core::parse_document;
use serde_json::Value;

pub async fn run(args: AddArgs, library: &Library, format: OutputFormat) -> Result<()> {
    let json = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let mut doc = parse_document(&json)?;
    if let Some(path) = args.path {
        doc.insert("path".to_string(), Value::String(path));
    }

    let archive = library.archive()?;
    archive.add_meta_to_db(&doc)?;

    let path = doc.get("path").and_then(Value::as_str).unwrap_or_default();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "added": path }));
        }
        OutputFormat::Cli => {
            println!("Added {}", path);
        }
    }
    Ok(())
}
