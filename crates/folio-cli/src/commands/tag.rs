//! Tag commands

use crate::app::{OutputFormat, TagAction, TagArgs};
use crate::library::Library;
use crate::output::print_json;
use anyhow::Result;
use folio_core::FolioError;

pub async fn run(args: TagArgs, library: &Library, format: OutputFormat) -> Result<()> {
    let archive = library.archive()?;

    match args.action {
        TagAction::Add { path, names } => {
            let mut record = archive
                .get_single(&path)?
                .ok_or_else(|| FolioError::ContentNotFound(path.clone()))?;
            let tags = archive.add_tags(&mut record, &names)?;
            match format {
                OutputFormat::Json => print_json(&tags)?,
                OutputFormat::Cli => {
                    for tag in tags {
                        println!("Tagged {} with {} #{}", path, tag.name, tag.tag_id);
                    }
                }
            }
        }
        TagAction::Rm { path, names } => {
            let mut record = archive
                .get_single(&path)?
                .ok_or_else(|| FolioError::ContentNotFound(path.clone()))?;
            let removed = archive.remove_tags(&mut record, &names)?;
            match format {
                OutputFormat::Json => print_json(&record.tags())?,
                OutputFormat::Cli => println!("Removed {} tag(s) from {}", removed, path),
            }
        }
        TagAction::Cloud => {
            let cloud = archive.get_tag_cloud()?;
            match format {
                OutputFormat::Json => print_json(&cloud)?,
                OutputFormat::Cli => {
                    for tag in cloud {
                        println!("{:>5}  {} #{}", tag.count, tag.name, tag.tag_id);
                    }
                }
            }
        }
        TagAction::Name { tag_id } => {
            let name = archive
                .get_tag_name(tag_id)?
                .ok_or_else(|| FolioError::ContentNotFound(format!("tag #{}", tag_id)))?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "tag_id": tag_id, "name": name }))
                }
                OutputFormat::Cli => println!("{}", name),
            }
        }
    }
    Ok(())
}
