//! List and count commands

use crate::app::{OutputFormat, QueryArgs};
use crate::library::Library;
use crate::output::{print_json, record_line};
use anyhow::Result;
use folio_core::{ContentQuery, ContentType};

fn build_query(args: &QueryArgs) -> Result<ContentQuery> {
    let mut query = ContentQuery::new().limit(args.limit).offset(args.offset);
    if let Some(terms) = &args.terms {
        query = query.terms(terms.clone());
    }
    if let Some(tag) = args.tag {
        query = query.tag(tag);
    }
    if let Some(lang) = &args.lang {
        query = query.language(lang.clone());
    }
    if let Some(name) = &args.content_type {
        query = query.content_type(name.parse::<ContentType>()?);
    }
    Ok(query)
}

pub async fn run(args: QueryArgs, library: &Library, format: OutputFormat) -> Result<()> {
    let query = build_query(&args)?;
    let records = library.archive()?.get_content(&query)?;

    match format {
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Cli => {
            for record in &records {
                println!("{}", record_line(record));
            }
        }
    }
    Ok(())
}

pub async fn run_count(args: QueryArgs, library: &Library, format: OutputFormat) -> Result<()> {
    let query = build_query(&args)?;
    let count = library.archive()?.get_count(&query)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "count": count })),
        OutputFormat::Cli => println!("{}", count),
    }
    Ok(())
}
