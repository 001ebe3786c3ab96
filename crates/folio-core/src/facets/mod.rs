//! Facets: derived per-file metadata
//!
//! Facets are computed by [`FacetProcessor`]s selected by file extension and
//! persisted in a separate store. Lookups can return partial facets computed
//! on the spot while full generation runs later through a [`TaskScheduler`].
//!
//! [`TaskScheduler`]: crate::scheduler::TaskScheduler

mod archive;
mod processors;
mod service;

pub use archive::FacetArchive;
pub use processors::{HtmlProcessor, MediaProcessor, INDEX_NAMES};
pub use service::{generate_facets, FacetService, Facets};

use crate::document::Document;
use crate::error::{FolioError, Result};
use crate::fsal::{split_name, split_path, Fsal};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Facet categories; each owns a bit of `facet_types`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FacetType {
    Generic,
    Updates,
    Html,
    Video,
    Audio,
    Image,
}

impl FacetType {
    pub const ALL: [FacetType; 6] = [
        FacetType::Generic,
        FacetType::Updates,
        FacetType::Html,
        FacetType::Video,
        FacetType::Audio,
        FacetType::Image,
    ];

    pub fn bit(self) -> u32 {
        match self {
            FacetType::Generic => 1,
            FacetType::Updates => 2,
            FacetType::Html => 4,
            FacetType::Video => 8,
            FacetType::Audio => 16,
            FacetType::Image => 32,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FacetType::Generic => "generic",
            FacetType::Updates => "updates",
            FacetType::Html => "html",
            FacetType::Video => "video",
            FacetType::Audio => "audio",
            FacetType::Image => "image",
        }
    }

    /// Whether `facet_types` has this type's bit set
    pub fn is_set(self, facet_types: u32) -> bool {
        facet_types & self.bit() == self.bit()
    }
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FacetType {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        FacetType::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .ok_or_else(|| FolioError::InvalidInput(format!("Unknown facet type: {}", s)))
    }
}

/// Extracts facets for files with particular extensions
pub trait FacetProcessor: Send + Sync {
    /// Facet type this processor produces
    fn facet_type(&self) -> FacetType;

    /// Lowercase extensions handled, without the dot
    fn extensions(&self) -> &[&'static str];

    /// Add this processor's facets for `path` to `facets`.
    ///
    /// Partial processing must be cheap and must not read file contents.
    fn process_file(
        &self,
        facets: &mut Document,
        path: &str,
        fsal: &dyn Fsal,
        partial: bool,
    ) -> Result<()>;

    fn name(&self) -> &'static str {
        self.facet_type().name()
    }
}

/// Ordered set of facet processors
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn FacetProcessor>>,
}

impl ProcessorRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Create registry with the built-in processors
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HtmlProcessor));
        registry.register(Arc::new(MediaProcessor::video()));
        registry.register(Arc::new(MediaProcessor::audio()));
        registry.register(Arc::new(MediaProcessor::image()));
        registry
    }

    /// Register a processor
    pub fn register(&mut self, processor: Arc<dyn FacetProcessor>) {
        self.processors.push(processor);
    }

    /// Processors handling the extension of `path`
    pub fn for_path(&self, path: &str) -> Vec<Arc<dyn FacetProcessor>> {
        let (_, name) = split_path(path);
        let (_, ext) = split_name(name);
        if ext.is_empty() {
            return Vec::new();
        }
        self.processors
            .iter()
            .filter(|p| p.extensions().iter().any(|e| *e == ext))
            .cloned()
            .collect()
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

pub(crate) fn is_html_ext(ext: &str) -> bool {
    matches!(ext, "html" | "htm")
}

/// Pick the index page among `paths`.
///
/// HTML files whose stem equals an entry of [`INDEX_NAMES`] win by priority;
/// otherwise the first HTML file is used. Returns the file name.
pub fn find_html_index<S: AsRef<str>>(paths: &[S]) -> Option<String> {
    let mut first_html: Option<&str> = None;
    let mut best: Option<(usize, &str)> = None;

    for path in paths {
        let (_, fname) = split_path(path.as_ref());
        let (stem, ext) = split_name(fname);
        if !is_html_ext(&ext) {
            continue;
        }
        first_html.get_or_insert(fname);
        if let Some(rank) = INDEX_NAMES.iter().position(|n| *n == stem) {
            if best.map_or(true, |(best_rank, _)| rank < best_rank) {
                best = Some((rank, fname));
            }
        }
    }

    best.map(|(_, fname)| fname)
        .or(first_html)
        .map(String::from)
}

/// Facet types available for `paths`. Always includes generic and updates.
pub fn get_facet_types<S: AsRef<str>>(registry: &ProcessorRegistry, paths: &[S]) -> Vec<FacetType> {
    let mut types = vec![FacetType::Generic, FacetType::Updates];
    for path in paths {
        types.extend(registry.for_path(path.as_ref()).iter().map(|p| p.facet_type()));
    }
    types.sort();
    types.dedup();
    types
}

/// Whether a processor of `facet_type` handles `path`
pub fn is_facet_valid(registry: &ProcessorRegistry, path: &str, facet_type: FacetType) -> bool {
    registry
        .for_path(path)
        .iter()
        .any(|p| p.facet_type() == facet_type)
}

/// Paths that a processor of `facet_type` handles
pub fn filter_by_facet_type<'a, S: AsRef<str>>(
    registry: &'a ProcessorRegistry,
    paths: &'a [S],
    facet_type: FacetType,
) -> impl Iterator<Item = &'a str> + 'a {
    paths
        .iter()
        .map(|p| p.as_ref())
        .filter(move |p| is_facet_valid(registry, p, facet_type))
}
