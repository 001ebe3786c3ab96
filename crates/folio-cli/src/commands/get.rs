//! Get command

use crate::app::{GetArgs, OutputFormat};
use crate::library::Library;
use crate::output::{document_lines, print_json};
use anyhow::Result;
use folio_core::FolioError;

pub async fn run(args: GetArgs, library: &Library, format: OutputFormat) -> Result<()> {
    let archive = library.archive()?;
    let record = archive
        .get_single(&args.path)?
        .ok_or_else(|| FolioError::ContentNotFound(args.path.clone()))?;

    match format {
        OutputFormat::Json => print_json(&record)?,
        OutputFormat::Cli => {
            for line in document_lines(record.document()) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
