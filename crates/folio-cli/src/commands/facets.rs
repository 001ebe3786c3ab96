//! Facets and index commands

use crate::app::{FacetsArgs, IndexArgs, OutputFormat};
use crate::library::Library;
use crate::output::{document_lines, print_json};
use anyhow::Result;
use folio_core::{find_html_index, FacetType};

pub async fn run(args: FacetsArgs, library: &Library, format: OutputFormat) -> Result<()> {
    let facet_type = args
        .facet_type
        .as_deref()
        .map(str::parse::<FacetType>)
        .transpose()?;

    let (service, scheduler) = library.facet_service()?;
    let results = service.get_facets(&args.paths, !args.full, facet_type)?;

    match format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Cli => {
            for (path, facets) in args.paths.iter().zip(&results) {
                match facets {
                    Some(facets) => {
                        let marker = if facets.partial { " (partial)" } else { "" };
                        println!("{}{}", path, marker);
                        for line in document_lines(&facets.data) {
                            println!("  {}", line);
                        }
                    }
                    None => println!("{}: no facets", path),
                }
            }
        }
    }

    // finish scheduled generation before the runtime shuts down
    scheduler.wait().await;
    Ok(())
}

pub async fn run_index(args: IndexArgs, format: OutputFormat) -> Result<()> {
    let index = find_html_index(&args.paths);

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "index": index })),
        OutputFormat::Cli => match index {
            Some(index) => println!("{}", index),
            None => println!("No HTML file"),
        },
    }
    Ok(())
}
