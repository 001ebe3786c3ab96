//! Persistent facets store

use super::{FacetType, ProcessorRegistry};
use crate::db::Database;
use crate::document::Document;
use crate::error::{FolioError, Result};
use crate::fsal::{split_path, Fsal};
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// Facets database together with the processors and fsal used to fill it
pub struct FacetArchive {
    db: Mutex<Database>,
    registry: Arc<ProcessorRegistry>,
    fsal: Arc<dyn Fsal>,
}

impl FacetArchive {
    /// Wrap an opened facets database, initializing its schema
    pub fn new(db: Database, registry: Arc<ProcessorRegistry>, fsal: Arc<dyn Fsal>) -> Result<Self> {
        db.initialize_facets()?;
        Ok(Self {
            db: Mutex::new(db),
            registry,
            fsal,
        })
    }

    pub fn fsal(&self) -> &dyn Fsal {
        self.fsal.as_ref()
    }

    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| FolioError::InvariantViolation("Facets database lock poisoned".to_string()))
    }

    /// Skeleton facets for a file: its directory, name and the generic type
    pub fn create_partial(path: &str) -> Document {
        let (parent, name) = split_path(path);
        let mut facets = Document::new();
        facets.insert("path".to_string(), Value::String(parent.to_string()));
        facets.insert("file".to_string(), Value::String(name.to_string()));
        facets.insert("facet_types".to_string(), Value::from(FacetType::Generic.bit()));
        facets
    }

    /// Stored facets for `path`, optionally only when they carry `facet_type`
    pub fn get_facets(&self, path: &str, facet_type: Option<FacetType>) -> Result<Option<Document>> {
        let db = self.lock()?;
        let row = db
            .conn()
            .query_row(
                "SELECT facet_types, data FROM facets WHERE path = ?1",
                [path],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let (facet_types, data) = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        if let Some(facet_type) = facet_type {
            if !facet_type.is_set(facet_types as u32) {
                return Ok(None);
            }
        }

        match serde_json::from_str::<Value>(&data)? {
            Value::Object(facets) => Ok(Some(facets)),
            _ => {
                tracing::warn!("Discarding malformed facets for '{}'", path);
                Ok(None)
            }
        }
    }

    /// Persist facets for `path`, replacing any previous entry
    pub fn save_facets(&self, path: &str, facets: &Document) -> Result<()> {
        let (_, file) = split_path(path);
        let facet_types = facets
            .get("facet_types")
            .and_then(Value::as_i64)
            .unwrap_or(i64::from(FacetType::Generic.bit()));
        let data = serde_json::to_string(facets)?;
        let updated = chrono::Utc::now().to_rfc3339();

        let db = self.lock()?;
        db.conn().execute(
            "INSERT OR REPLACE INTO facets (path, file, facet_types, data, updated)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![path, file, facet_types, data, updated],
        )?;
        Ok(())
    }

    /// Remove stored facets. Returns the number of rows removed.
    pub fn remove_facets(&self, path: &str) -> Result<usize> {
        let db = self.lock()?;
        Ok(db.conn().execute("DELETE FROM facets WHERE path = ?1", [path])?)
    }

    /// Run every matching processor over `path`
    pub fn generate(&self, path: &str, partial: bool) -> Result<Document> {
        let mut facets = Self::create_partial(path);
        for processor in self.registry.for_path(path) {
            processor.process_file(&mut facets, path, self.fsal.as_ref(), partial)?;
        }
        Ok(facets)
    }

    /// Generate full facets for `path` and persist them
    pub fn update_facets(&self, path: &str) -> Result<Document> {
        tracing::debug!("Generating facets for '{}'", path);
        let facets = self.generate(path, false)?;
        self.save_facets(path, &facets)?;
        Ok(facets)
    }

    /// Cheap facets computed without persisting. `None` when the file does
    /// not exist or a processor fails.
    pub fn generate_partial(&self, path: &str) -> Option<Document> {
        self.fsal.get_fso(path)?;
        match self.generate(path, true) {
            Ok(facets) => Some(facets),
            Err(e) => {
                tracing::warn!("Partial facets for '{}' failed: {}", path, e);
                None
            }
        }
    }
}
