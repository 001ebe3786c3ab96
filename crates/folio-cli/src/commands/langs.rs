//! Languages command

use crate::app::OutputFormat;
use crate::library::Library;
use crate::output::print_json;
use anyhow::Result;

pub async fn run(library: &Library, format: OutputFormat) -> Result<()> {
    let languages = library.archive()?.get_content_languages()?;

    match format {
        OutputFormat::Json => print_json(&languages)?,
        OutputFormat::Cli => {
            for language in languages {
                println!("{}", language);
            }
        }
    }
    Ok(())
}
