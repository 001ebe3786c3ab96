//! View command

use crate::app::{OutputFormat, PathArgs};
use crate::library::Library;
use anyhow::Result;
use folio_core::FolioError;

pub async fn run(args: PathArgs, library: &Library, format: OutputFormat) -> Result<()> {
    let archive = library.archive()?;
    if archive.get_single(&args.path)?.is_none() {
        return Err(FolioError::ContentNotFound(args.path).into());
    }
    archive.add_view(&args.path)?;

    let views = archive
        .get_single(&args.path)?
        .map(|record| record.views())
        .unwrap_or_default();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "path": args.path, "views": views }))
        }
        OutputFormat::Cli => println!("{} views: {}", args.path, views),
    }
    Ok(())
}
