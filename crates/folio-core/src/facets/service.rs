//! On-demand facet lookup and scheduled generation

use super::{FacetArchive, FacetType};
use crate::document::Document;
use crate::error::Result;
use crate::scheduler::TaskScheduler;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Facets for one file as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facets {
    pub path: String,
    pub data: Document,
    /// Computed on the spot and not persisted
    pub partial: bool,
}

/// Facet lookups backed by a store, with background generation of whatever
/// is missing
pub struct FacetService {
    archive: Arc<FacetArchive>,
    scheduler: Arc<dyn TaskScheduler>,
    delay: Duration,
}

impl FacetService {
    pub fn new(archive: Arc<FacetArchive>, scheduler: Arc<dyn TaskScheduler>, delay: Duration) -> Self {
        Self {
            archive,
            scheduler,
            delay,
        }
    }

    pub fn archive(&self) -> &Arc<FacetArchive> {
        &self.archive
    }

    /// Look up facets for each path, in order.
    ///
    /// Paths without stored facets are queued for generation in a single
    /// scheduled job. With `partial`, such paths get facets computed on the
    /// spot (`None` if the file does not exist).
    pub fn get_facets<S: AsRef<str>>(
        &self,
        paths: &[S],
        partial: bool,
        facet_type: Option<FacetType>,
    ) -> Result<Vec<Option<Facets>>> {
        let mut results = Vec::with_capacity(paths.len());
        let mut missing: Vec<String> = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if let Some(data) = self.archive.get_facets(path, facet_type)? {
                results.push(Some(Facets {
                    path: path.to_string(),
                    data,
                    partial: false,
                }));
                continue;
            }

            tracing::debug!("Facets not found for '{}', scheduling generation", path);
            if !missing.iter().any(|m| m == path) {
                missing.push(path.to_string());
            }

            let facets = if partial {
                self.archive.generate_partial(path).map(|data| Facets {
                    path: path.to_string(),
                    data,
                    partial: true,
                })
            } else {
                None
            };
            results.push(facets);
        }

        if !missing.is_empty() {
            self.schedule_generation(missing);
        }

        Ok(results)
    }

    fn schedule_generation(&self, paths: Vec<String>) {
        let archive = Arc::clone(&self.archive);
        self.scheduler.schedule(
            Box::new(move || generate_facets(&archive, &paths).map(|_| ())),
            self.delay,
        );
    }
}

/// Generate and persist facets for each path that still lacks them.
/// Vanished files are skipped. Returns the number of files generated.
pub fn generate_facets<S: AsRef<str>>(archive: &FacetArchive, paths: &[S]) -> Result<usize> {
    let mut generated = 0;
    for path in paths {
        let path = path.as_ref();
        tracing::debug!("Scheduled facet generation triggered for '{}'", path);

        if archive.fsal().get_fso(path).is_none() {
            tracing::debug!("Facet generation cancelled, '{}' does not exist", path);
            continue;
        }

        if archive.get_facets(path, None)?.is_some() {
            tracing::debug!("Facets already generated for '{}'", path);
            continue;
        }

        match archive.update_facets(path) {
            Ok(_) => generated += 1,
            Err(e) => tracing::warn!("Facet generation failed for '{}': {}", path, e),
        }
    }
    Ok(generated)
}
