//! Opened databases, configuration and content directory for one invocation

use anyhow::Result;
use folio_core::{
    Archive, Config, Database, FacetArchive, FacetService, Fsal, LocalFsal, ProcessorRegistry,
    TokioScheduler,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct Library {
    pub config: Config,
    pub db: Database,
    pub fsal: Arc<dyn Fsal>,
}

impl Library {
    /// Load the config and open the content database
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Ok(dir) = std::env::var("FOLIO_CONTENT_DIR") {
            config.library.contentdir = PathBuf::from(dir);
        }

        let db_path = config.database.content_path();
        tracing::debug!("Opening content database at {}", db_path.display());
        let db = Database::open(&db_path)?;
        db.initialize()?;

        let fsal: Arc<dyn Fsal> = Arc::new(LocalFsal::new(&config.library.contentdir));
        Ok(Self { config, db, fsal })
    }

    pub fn archive(&self) -> Result<Archive<'_>> {
        let archive_config = self.config.archive()?;
        Ok(Archive::new(&self.db, Arc::clone(&self.fsal), archive_config))
    }

    /// Facet service over the facets database, with a scheduler the caller
    /// can wait on before exiting
    pub fn facet_service(&self) -> Result<(FacetService, Arc<TokioScheduler>)> {
        let facets_path = self.config.database.facets_path();
        tracing::debug!("Opening facets database at {}", facets_path.display());
        let archive = FacetArchive::new(
            Database::open(&facets_path)?,
            Arc::new(ProcessorRegistry::with_defaults()),
            Arc::clone(&self.fsal),
        )?;

        let scheduler = Arc::new(TokioScheduler::new()?);
        let service = FacetService::new(
            Arc::new(archive),
            scheduler.clone(),
            self.config.facets.delay(),
        );
        Ok((service, scheduler))
    }
}
