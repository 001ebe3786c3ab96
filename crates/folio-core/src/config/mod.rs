//! Configuration management

use crate::content_type::{ContentType, ContentTypes};
use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Content library settings
    #[serde(default)]
    pub library: LibraryConfig,

    /// Facet generation settings
    #[serde(default)]
    pub facets: FacetsConfig,

    /// Database locations
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Content library configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Root of the content directory
    #[serde(default = "default_contentdir")]
    pub contentdir: PathBuf,

    /// File names recognized as metadata documents
    #[serde(default = "default_meta_filenames")]
    pub meta_filenames: Vec<String>,

    /// Content types hidden from the mixed content list
    #[serde(default = "default_exclude_from_content_list")]
    pub exclude_from_content_list: Vec<String>,

    /// Content types whose sub-entity is loaded along with list results
    #[serde(default = "default_prefetchable_types")]
    pub prefetchable_types: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            contentdir: default_contentdir(),
            meta_filenames: default_meta_filenames(),
            exclude_from_content_list: default_exclude_from_content_list(),
            prefetchable_types: default_prefetchable_types(),
        }
    }
}

fn default_contentdir() -> PathBuf {
    std::env::var("FOLIO_CONTENT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::CACHE_DIR_NAME)
                .join("content")
        })
}

fn default_meta_filenames() -> Vec<String> {
    vec!["info.json".to_string()]
}

fn default_exclude_from_content_list() -> Vec<String> {
    vec!["app".to_string()]
}

fn default_prefetchable_types() -> Vec<String> {
    vec!["audio".to_string(), "image".to_string(), "video".to_string()]
}

/// Facet generation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FacetsConfig {
    /// Seconds to wait before running on-demand facet generation
    #[serde(default)]
    pub ondemand_delay: u64,
}

impl FacetsConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.ondemand_delay)
    }
}

/// Database file locations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub content: Option<PathBuf>,

    #[serde(default)]
    pub facets: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Content database path: `FOLIO_DB`, then config, then the cache default
    pub fn content_path(&self) -> PathBuf {
        std::env::var("FOLIO_DB")
            .map(PathBuf::from)
            .ok()
            .or_else(|| self.content.clone())
            .unwrap_or_else(crate::Database::default_path)
    }

    /// Facets database path: `FOLIO_FACETS_DB`, then config, then the cache default
    pub fn facets_path(&self) -> PathBuf {
        std::env::var("FOLIO_FACETS_DB")
            .map(PathBuf::from)
            .ok()
            .or_else(|| self.facets.clone())
            .unwrap_or_else(crate::Database::default_facets_path)
    }
}

/// Resolved archive settings
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub meta_filenames: Vec<String>,
    pub exclude_from_content_list: ContentTypes,
    pub prefetchable_types: Vec<ContentType>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            meta_filenames: default_meta_filenames(),
            exclude_from_content_list: ContentType::App.into(),
            prefetchable_types: vec![ContentType::Audio, ContentType::Image, ContentType::Video],
        }
    }
}

impl TryFrom<&LibraryConfig> for ArchiveConfig {
    type Error = FolioError;

    fn try_from(library: &LibraryConfig) -> Result<Self> {
        let prefetchable_types = library
            .prefetchable_types
            .iter()
            .map(|name| name.parse::<ContentType>())
            .collect::<Result<Vec<_>>>()
            .map_err(|e| FolioError::Config(format!("library.prefetchable_types: {}", e)))?;

        let exclude_from_content_list =
            ContentTypes::from_names(&library.exclude_from_content_list).map_err(|e| {
                FolioError::Config(format!("library.exclude_from_content_list: {}", e))
            })?;

        Ok(Self {
            meta_filenames: library.meta_filenames.clone(),
            exclude_from_content_list,
            prefetchable_types,
        })
    }
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from `path`, falling back to defaults when it is absent
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Archive settings derived from the library section
    pub fn archive(&self) -> Result<ArchiveConfig> {
        ArchiveConfig::try_from(&self.library)
    }
}
