//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(
    author,
    version,
    about = "Content metadata archive and file facets for a local content library"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a metadata document to the archive
    Add(AddArgs),

    /// Show a content record with its sub-entities
    Get(GetArgs),

    /// List content
    Ls(QueryArgs),

    /// Count content
    Count(QueryArgs),

    /// Remove a content record
    #[command(alias = "remove")]
    Rm(PathArgs),

    /// Record a view of a content record
    View(PathArgs),

    /// Manage tags
    Tag(TagArgs),

    /// List content languages
    Langs,

    /// Rebuild the archive from the content directory
    Reload,

    /// Show facets for files, generating missing ones
    Facets(FacetsArgs),

    /// Pick the HTML index page among files
    Index(IndexArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Metadata JSON file
    pub file: PathBuf,

    /// Content path, when the document does not carry one
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Content path
    pub path: String,
}

#[derive(Args)]
pub struct PathArgs {
    /// Content path
    pub path: String,
}

#[derive(Args, Clone, Default)]
pub struct QueryArgs {
    /// Match title, publisher or keywords
    #[arg(long)]
    pub terms: Option<String>,

    /// Tag id
    #[arg(long)]
    pub tag: Option<i64>,

    /// Language code
    #[arg(long)]
    pub lang: Option<String>,

    /// Content type (html, video, audio, app, image)
    #[arg(long = "type")]
    pub content_type: Option<String>,

    /// Maximum number of results (0 = unlimited)
    #[arg(short = 'n', long, default_value = "0")]
    pub limit: usize,

    /// Number of results to skip
    #[arg(long, default_value = "0")]
    pub offset: usize,
}

#[derive(Args)]
pub struct TagArgs {
    #[command(subcommand)]
    pub action: TagAction,
}

#[derive(Subcommand)]
pub enum TagAction {
    /// Attach tags to a record
    Add {
        path: String,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Detach tags from a record
    #[command(alias = "remove")]
    Rm {
        path: String,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Show tags by usage
    Cloud,
    /// Look up a tag name by id
    Name { tag_id: i64 },
}

#[derive(Args)]
pub struct FacetsArgs {
    /// File paths relative to the content directory
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Skip partial facets; only stored facets are shown
    #[arg(long)]
    pub full: bool,

    /// Only facets of this type (generic, updates, html, video, audio, image)
    #[arg(long = "type")]
    pub facet_type: Option<String>,
}

#[derive(Args)]
pub struct IndexArgs {
    /// Candidate file paths
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Cli,
    Json,
}
