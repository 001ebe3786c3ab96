//! Folio CLI
//!
//! Content metadata archive and file facets for a local content library.

use anyhow::Result;
use clap::Parser;
use folio_core::FolioError;

mod app;
mod commands;
mod library;
mod output;

use app::{Cli, Commands};
use library::Library;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<FolioError>()
            .map(FolioError::exit_code)
            .unwrap_or(folio_core::error::exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let library = Library::open(cli.config.as_deref())?;

    match cli.command {
        Commands::Add(args) => commands::add::run(args, &library, cli.format).await,
        Commands::Get(args) => commands::get::run(args, &library, cli.format).await,
        Commands::Ls(args) => commands::ls::run(args, &library, cli.format).await,
        Commands::Count(args) => commands::ls::run_count(args, &library, cli.format).await,
        Commands::Rm(args) => commands::rm::run(args, &library, cli.format).await,
        Commands::View(args) => commands::view::run(args, &library, cli.format).await,
        Commands::Tag(args) => commands::tag::run(args, &library, cli.format).await,
        Commands::Langs => commands::langs::run(&library, cli.format).await,
        Commands::Reload => commands::reload::run(&library, cli.format, cli.verbose).await,
        Commands::Facets(args) => commands::facets::run(args, &library, cli.format).await,
        Commands::Index(args) => commands::facets::run_index(args, cli.format).await,
    }
}
