//! Reload command

use crate::app::OutputFormat;
use crate::library::Library;
use anyhow::Result;

pub async fn run(library: &Library, format: OutputFormat, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!(
            "Reloading content from {}",
            library.config.library.contentdir.display()
        );
    }

    let archive = library.archive()?;
    let count = archive.clear_and_reload()?;
    let last_update = archive.last_update()?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "loaded": count, "last_update": last_update })
        ),
        OutputFormat::Cli => {
            println!("Loaded {} content item(s)", count);
            if let Some(updated) = last_update {
                println!("Last update: {}", updated);
            }
        }
    }
    Ok(())
}
