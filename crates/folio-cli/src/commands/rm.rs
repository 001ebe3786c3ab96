//! Remove command

use crate::app::{OutputFormat, PathArgs};
use crate::library::Library;
use anyhow::Result;
use folio_core::FolioError;

pub async fn run(args: PathArgs, library: &Library, format: OutputFormat) -> Result<()> {
    let removed = library.archive()?.remove_meta_from_db(&args.path)?;
    if removed == 0 {
        return Err(FolioError::ContentNotFound(args.path).into());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "removed": removed })),
        OutputFormat::Cli => println!("Removed {}", args.path),
    }
    Ok(())
}
