//! Folio Core Library
//!
//! Content-metadata archive and facets store for a local content library.
//!
//! # Features
//! - Declarative reshaping of nested metadata documents
//! - Schema-driven decomposition into SQLite tables and reassembly on read
//! - Content listing filtered by terms, tags, language and content type bitmask
//! - Tagging and view counting
//! - On-demand facet extraction with delayed background generation

pub mod archive;
pub mod config;
pub mod content_type;
pub mod db;
pub mod document;
pub mod error;
pub mod facets;
pub mod fsal;
pub mod scheduler;
pub mod transform;

pub use archive::{Archive, ContentQuery, Relation, Tag, TagCount};
pub use config::{ArchiveConfig, Config, DatabaseConfig, FacetsConfig, LibraryConfig};
pub use content_type::{ContentType, ContentTypes};
pub use db::Database;
pub use document::{parse_document, ContentRecord, Document, TagMap};
pub use error::{Error, FolioError, Result};
pub use facets::{
    filter_by_facet_type, find_html_index, generate_facets, get_facet_types, is_facet_valid,
    FacetArchive, FacetProcessor, FacetService, FacetType, Facets, ProcessorRegistry,
};
pub use fsal::{FsObject, Fsal, LocalFsal};
pub use scheduler::{Task, TaskScheduler, TokioScheduler};
pub use transform::{default_rules, serialize, Rule, Transformation};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "folio";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "folio";
