//! Content archive
//!
//! Stores metadata documents as a `content` row plus typed sub-entity rows,
//! and reassembles them on read. Tagging, search and view counting live in
//! the submodules.

pub mod reader;
pub mod schema;
mod search;
mod tags;
pub mod writer;

pub use schema::{Relation, CONTENT_TABLE};
pub use search::ContentQuery;
pub use tags::{Tag, TagCount};

use crate::config::ArchiveConfig;
use crate::content_type::{ContentType, ContentTypes};
use crate::db::query::{quote_ident, sql_in, Select};
use crate::db::rows::{query_document, query_documents};
use crate::db::{apply_writes, Database};
use crate::document::{parse_document, ContentRecord, Document};
use crate::error::{FolioError, Result};
use crate::fsal::{split_path, Fsal};
use crate::transform::{default_rules, serialize, Rule};
use writer::RowWrite;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::sync::Arc;

/// Content archive over a content database and a content directory
pub struct Archive<'a> {
    db: &'a Database,
    fsal: Arc<dyn Fsal>,
    config: ArchiveConfig,
    rules: Vec<Rule>,
}

impl<'a> Archive<'a> {
    pub fn new(db: &'a Database, fsal: Arc<dyn Fsal>, config: ArchiveConfig) -> Self {
        Self {
            db,
            fsal,
            config,
            rules: default_rules(),
        }
    }

    /// Replace the transformation rules applied by [`Archive::add_meta_to_db`]
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    fn conn(&self) -> &Connection {
        self.db.conn()
    }

    /// Store a metadata document.
    ///
    /// The document is reshaped by the archive rules and written in one
    /// transaction. A `replaces` reference to another path removes that
    /// record in the same transaction.
    pub fn add_meta_to_db(&self, metadata: &Document) -> Result<()> {
        tracing::debug!("Adding new content to archive database");

        let replaces = metadata
            .get("replaces")
            .and_then(Value::as_str)
            .map(String::from);

        let mut doc = serialize(metadata, &self.rules);
        let path = match doc.get("path") {
            Some(Value::String(path)) if !path.is_empty() => path.clone(),
            _ => {
                return Err(FolioError::InvalidInput(
                    "Metadata has no path".to_string(),
                ))
            }
        };

        // typed bits always follow the sub-entities present; only the
        // table-less generic bit is taken from an explicit value
        let explicit = doc
            .get("content_type")
            .and_then(Value::as_u64)
            .map(|bits| ContentTypes::from_bits(bits as u32))
            .unwrap_or_default();
        let mut mask = ContentTypes::from_document(&doc);
        if explicit.contains(ContentType::Generic) {
            mask = mask | ContentTypes::from(ContentType::Generic);
        }
        doc.insert("content_type".to_string(), Value::from(mask.bits()));

        let mut shared = Document::new();
        shared.insert("path".to_string(), Value::String(path.clone()));
        let mut writes = writer::decompose(CONTENT_TABLE, &doc, &shared)?;

        self.db.transaction(|tx| {
            carry_forward_counters(tx, &path, &mut writes)?;
            delete_subentities(tx, &path)?;
            apply_writes(tx, &writes)?;

            if let Some(old) = replaces.as_deref().filter(|old| *old != path) {
                tracing::debug!("Removing replaced content '{}' from archive database", old);
                delete_content(tx, old)?;
            }
            Ok(())
        })
    }

    /// Remove a record with its sub-entities and taggings. Returns the number
    /// of content rows removed.
    pub fn remove_meta_from_db(&self, path: &str) -> Result<usize> {
        tracing::debug!("Removing {} from archive database", path);
        self.db.transaction(|tx| delete_content(tx, path))
    }

    /// Load one record with every typed sub-entity its content type names
    pub fn get_single(&self, path: &str) -> Result<Option<ContentRecord>> {
        let conn = self.conn();
        let doc = query_document(conn, "SELECT * FROM content WHERE path = ?1", [path])?;
        let mut doc = match doc {
            Some(doc) => doc,
            None => return Ok(None),
        };

        let mask = doc
            .get("content_type")
            .and_then(Value::as_u64)
            .map(|bits| ContentTypes::from_bits(bits as u32))
            .unwrap_or_default();

        for content_type in mask.iter() {
            if let Some(table) = content_type.table() {
                reader::fetch(conn, table, path, &mut doc, Relation::Singular)?;
            }
        }

        Ok(Some(ContentRecord::from_document(doc)?))
    }

    /// Content rows for `paths`, optionally restricted to `fields`
    pub fn get_multiple<S: AsRef<str>>(
        &self,
        paths: &[S],
        fields: Option<&[&str]>,
    ) -> Result<Vec<Document>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let what = match fields {
            Some(fields) if !fields.is_empty() => fields
                .iter()
                .map(|f| quote_ident(f))
                .collect::<Result<Vec<_>>>()?,
            _ => vec!["*".to_string()],
        };

        let select = Select::new(CONTENT_TABLE)
            .what(what)
            .filter(sql_in("path", paths.len()), []);
        let params = paths.iter().map(|p| p.as_ref());
        query_documents(self.conn(), &select.to_sql(), params_from_iter(params))
    }

    /// Enabled records whose URL mentions `domain`
    pub fn content_for_domain(&self, domain: &str) -> Result<Vec<ContentRecord>> {
        let pattern = format!("%{}%", domain.to_lowercase());
        let select = Select::new(CONTENT_TABLE)
            .filter("url LIKE ?1 AND disabled = 0", [])
            .order(search::CONTENT_ORDER);
        query_documents(self.conn(), &select.to_sql(), [pattern])?
            .into_iter()
            .map(ContentRecord::from_document)
            .collect()
    }

    /// `updated` value of the most recently updated record
    pub fn last_update(&self) -> Result<Option<String>> {
        let updated = self
            .conn()
            .query_row(
                "SELECT updated FROM content ORDER BY updated DESC LIMIT 1",
                [],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(updated.flatten())
    }

    /// Increment the view counter of exactly one record
    pub fn add_view(&self, path: &str) -> Result<usize> {
        self.db.transaction(|tx| {
            let rows = tx.execute(
                "UPDATE content SET views = COALESCE(views, 0) + 1 WHERE path = ?1",
                [path],
            )?;
            if rows != 1 {
                return Err(FolioError::InvariantViolation(format!(
                    "View update for '{}' touched {} rows",
                    path, rows
                )));
            }
            Ok(rows)
        })
    }

    /// Whether the record's HTML should be reformatted; `None` if unknown
    pub fn needs_formatting(&self, path: &str) -> Result<Option<bool>> {
        let keep = self
            .conn()
            .query_row(
                "SELECT keep_formatting FROM content WHERE path = ?1",
                [path],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(keep.map(|keep| keep.unwrap_or(0) == 0))
    }

    /// Distinct languages across all records
    pub fn get_content_languages(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn().prepare(
            "SELECT DISTINCT language FROM content WHERE language IS NOT NULL ORDER BY language",
        )?;
        let languages = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(languages)
    }

    /// Drop every record and rebuild the archive from the content directory
    pub fn clear_and_reload(&self) -> Result<usize> {
        tracing::debug!("Content refill started");
        self.db.transaction(|tx| {
            for table in schema::subtables() {
                tx.execute(&format!("DELETE FROM {}", quote_ident(table)?), [])?;
            }
            tx.execute("DELETE FROM taggings", [])?;
            tx.execute("DELETE FROM content", [])?;
            Ok(())
        })?;

        let rows = self.reload_content()?;
        tracing::info!("Content refill finished for {} pieces of content", rows);
        Ok(rows)
    }

    /// Add every metadata file found in the content directory. Files that
    /// fail to load are logged and skipped.
    pub fn reload_content(&self) -> Result<usize> {
        let mut added = 0;
        for fso in self.fsal.walk_files()? {
            if !self.config.meta_filenames.iter().any(|n| n == fso.name()) {
                continue;
            }
            match self.load_meta_file(&fso.rel_path) {
                Ok(()) => added += 1,
                Err(e) => tracing::warn!("Skipping metadata file '{}': {}", fso.rel_path, e),
            }
        }
        Ok(added)
    }

    fn load_meta_file(&self, rel_path: &str) -> Result<()> {
        let mut doc = parse_document(&self.fsal.read_to_string(rel_path)?)?;
        if !doc.contains_key("path") {
            let (parent, _) = split_path(rel_path);
            if parent.is_empty() {
                return Err(FolioError::InvalidInput(
                    "Metadata at the content root needs an explicit path".to_string(),
                ));
            }
            doc.insert("path".to_string(), Value::String(parent.to_string()));
        }
        self.add_meta_to_db(&doc)
    }
}

/// Columns owned by the archive rather than the metadata document. A re-added
/// record keeps them unless the document sets them.
const PRESERVED_COLUMNS: [&str; 2] = ["tags", "views"];

fn carry_forward_counters(conn: &Connection, path: &str, writes: &mut [RowWrite]) -> Result<()> {
    let existing = query_document(
        conn,
        "SELECT tags, views FROM content WHERE path = ?1",
        [path],
    )?;
    let existing = match existing {
        Some(existing) => existing,
        None => return Ok(()),
    };

    if let Some(row) = writes.iter_mut().find(|w| w.table == CONTENT_TABLE) {
        for column in PRESERVED_COLUMNS {
            if row.columns.contains_key(column) {
                continue;
            }
            if let Some(value) = existing.get(column) {
                row.columns.insert(column.to_string(), value.clone());
            }
        }
    }
    Ok(())
}

fn delete_subentities(conn: &Connection, path: &str) -> Result<()> {
    for table in schema::subtables() {
        conn.execute(
            &format!("DELETE FROM {} WHERE path = ?1", quote_ident(table)?),
            [path],
        )?;
    }
    Ok(())
}

/// Delete a record with its sub-entities and taggings
fn delete_content(conn: &Connection, path: &str) -> Result<usize> {
    delete_subentities(conn, path)?;
    conn.execute("DELETE FROM taggings WHERE path = ?1", [path])?;
    Ok(conn.execute("DELETE FROM content WHERE path = ?1", [path])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsal::LocalFsal;
    use serde_json::json;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    fn archive(db: &Database) -> Archive<'_> {
        Archive::new(db, Arc::new(LocalFsal::new("/nonexistent")), ArchiveConfig::default())
    }

    fn doc(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_add_and_get_single() {
        let db = setup();
        let archive = archive(&db);
        archive
            .add_meta_to_db(&doc(json!({
                "path": "a",
                "title": "Sweden",
                "content": {"html": {"main": "index.html"}}
            })))
            .unwrap();

        let record = archive.get_single("a").unwrap().unwrap();
        assert_eq!(record.title(), Some("Sweden"));
        assert_eq!(record.content_type().bits(), 2);
        assert_eq!(
            record.child("html"),
            Some(&json!({"path": "a", "main": "index.html"}))
        );
        assert!(archive.get_single("missing").unwrap().is_none());
    }

    #[test]
    fn test_content_type_follows_sub_entities() {
        let db = setup();
        let archive = archive(&db);
        archive
            .add_meta_to_db(&doc(json!({
                "path": "a",
                "content_type": ContentType::Video.bit(),
                "html": {"main": "index.html"}
            })))
            .unwrap();

        let record = archive.get_single("a").unwrap().unwrap();
        assert_eq!(record.content_type().bits(), ContentType::Html.bit());
        assert_eq!(record.child("html").unwrap()["main"], json!("index.html"));
        assert!(record.get("video").is_none());

        archive
            .add_meta_to_db(&doc(json!({
                "path": "b",
                "content_type": ContentType::Generic.bit() | ContentType::Audio.bit()
            })))
            .unwrap();
        let record = archive.get_single("b").unwrap().unwrap();
        assert_eq!(record.content_type().bits(), ContentType::Generic.bit());
        assert!(record.get("audio").is_none());
    }

    #[test]
    fn test_scalar_under_type_key_sets_no_type_bit() {
        let db = setup();
        let archive = archive(&db);
        archive
            .add_meta_to_db(&doc(json!({"path": "a", "html": "x"})))
            .unwrap();

        let record = archive.get_single("a").unwrap().unwrap();
        assert_eq!(record.content_type().bits(), 0);
        assert_eq!(record.get_str("html"), Some("x"));
    }

    #[test]
    fn test_readding_keeps_tags_and_views() {
        let db = setup();
        let archive = archive(&db);
        archive
            .add_meta_to_db(&doc(json!({"path": "a", "title": "v1"})))
            .unwrap();
        let mut record = archive.get_single("a").unwrap().unwrap();
        let tags = archive.add_tags(&mut record, &["rust"]).unwrap();
        archive.add_view("a").unwrap();

        archive
            .add_meta_to_db(&doc(json!({"path": "a", "title": "v2"})))
            .unwrap();

        let record = archive.get_single("a").unwrap().unwrap();
        assert_eq!(record.title(), Some("v2"));
        assert_eq!(record.views(), 1);
        assert_eq!(record.tags().get("rust"), Some(&tags[0].tag_id));

        let tagged = archive
            .get_content(&ContentQuery::new().tag(tags[0].tag_id))
            .unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].tags(), record.tags());

        archive
            .add_meta_to_db(&doc(json!({"path": "a", "views": 7})))
            .unwrap();
        assert_eq!(archive.get_single("a").unwrap().unwrap().views(), 7);
    }

    #[test]
    fn test_add_requires_path() {
        let db = setup();
        let result = archive(&db).add_meta_to_db(&doc(json!({"title": "x"})));
        assert!(matches!(result, Err(FolioError::InvalidInput(_))));
    }

    #[test]
    fn test_replaces_removes_old_record() {
        let db = setup();
        let archive = archive(&db);
        archive.add_meta_to_db(&doc(json!({"path": "old", "title": "v1"}))).unwrap();
        archive
            .add_meta_to_db(&doc(json!({"path": "new", "title": "v2", "replaces": "old"})))
            .unwrap();

        assert!(archive.get_single("old").unwrap().is_none());
        let record = archive.get_single("new").unwrap().unwrap();
        assert!(record.get("replaces").is_none());
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let db = setup();
        let archive = archive(&db);
        archive.add_meta_to_db(&doc(json!({"path": "old"}))).unwrap();
        let result = archive.add_meta_to_db(&doc(json!({
            "path": "new",
            "replaces": "old",
            "bad column": 1
        })));
        assert!(result.is_err());
        assert!(archive.get_single("old").unwrap().is_some());
        assert!(archive.get_single("new").unwrap().is_none());
    }

    #[test]
    fn test_remove_meta_from_db() {
        let db = setup();
        let archive = archive(&db);
        archive
            .add_meta_to_db(&doc(json!({"path": "a", "video": {"main": "v.mp4"}})))
            .unwrap();

        assert_eq!(archive.remove_meta_from_db("a").unwrap(), 1);
        assert_eq!(archive.remove_meta_from_db("a").unwrap(), 0);
        let leftover: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM video", [], |row| row.get(0))
            .unwrap();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn test_add_view() {
        let db = setup();
        let archive = archive(&db);
        archive.add_meta_to_db(&doc(json!({"path": "a"}))).unwrap();

        assert_eq!(archive.add_view("a").unwrap(), 1);
        assert_eq!(archive.get_single("a").unwrap().unwrap().views(), 1);
        assert!(matches!(
            archive.add_view("missing"),
            Err(FolioError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_lookups() {
        let db = setup();
        let archive = archive(&db);
        archive
            .add_meta_to_db(&doc(json!({
                "path": "a", "url": "http://en.Wikipedia.org/wiki/Sweden",
                "language": "en", "updated": "2015-01-01", "keep_formatting": true
            })))
            .unwrap();
        archive
            .add_meta_to_db(&doc(json!({
                "path": "b", "url": "http://example.com", "language": "de", "updated": "2015-02-01"
            })))
            .unwrap();

        assert_eq!(archive.last_update().unwrap().as_deref(), Some("2015-02-01"));
        assert_eq!(archive.get_content_languages().unwrap(), vec!["de", "en"]);
        assert_eq!(archive.needs_formatting("a").unwrap(), Some(false));
        assert_eq!(archive.needs_formatting("b").unwrap(), Some(true));
        assert_eq!(archive.needs_formatting("c").unwrap(), None);

        let hits = archive.content_for_domain("wikipedia.org").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path(), "a");

        let rows = archive.get_multiple(&["a", "b", "z"], Some(&["path", "language"])).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 2));
        assert!(archive.get_multiple::<&str>(&[], None).unwrap().is_empty());
    }
}
