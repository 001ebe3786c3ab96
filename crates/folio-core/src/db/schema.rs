//! Database schema and initialization

use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// Main database handle
pub struct Database {
    pub(crate) conn: Connection,
}

const SCHEMA_VERSION: i32 = 2;

const CREATE_CONTENT_TABLES: &str = r#"
-- Content records, keyed by relative path
CREATE TABLE IF NOT EXISTS content (
    path TEXT PRIMARY KEY,
    url TEXT,
    title TEXT,
    publisher TEXT,
    keywords TEXT,
    language TEXT,
    license TEXT,
    timestamp TEXT,
    updated TEXT,
    views INTEGER DEFAULT 0,
    content_type INTEGER DEFAULT 0,
    tags TEXT DEFAULT '{}',
    disabled INTEGER DEFAULT 0,
    keep_formatting INTEGER DEFAULT 0
);

-- Singular sub-entities share the content primary key
CREATE TABLE IF NOT EXISTS html (
    path TEXT PRIMARY KEY,
    main TEXT,
    keep_formatting INTEGER
);

CREATE TABLE IF NOT EXISTS video (
    path TEXT PRIMARY KEY,
    main TEXT,
    description TEXT,
    resolution TEXT,
    duration INTEGER
);

CREATE TABLE IF NOT EXISTS audio (
    path TEXT PRIMARY KEY,
    description TEXT
);

CREATE TABLE IF NOT EXISTS image (
    path TEXT PRIMARY KEY,
    description TEXT,
    resolution TEXT
);

CREATE TABLE IF NOT EXISTS app (
    path TEXT PRIMARY KEY,
    description TEXT,
    version TEXT
);

-- One-to-many sub-entities, identified by (path, file)
CREATE TABLE IF NOT EXISTS playlist (
    path TEXT NOT NULL,
    file TEXT,
    title TEXT,
    duration INTEGER,
    UNIQUE(path, file)
);

CREATE TABLE IF NOT EXISTS album (
    path TEXT NOT NULL,
    file TEXT,
    title TEXT,
    thumbnail TEXT,
    caption TEXT,
    UNIQUE(path, file)
);

-- Tags and taggings (many-to-many between content and tags)
CREATE TABLE IF NOT EXISTS tags (
    tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS taggings (
    tag_id INTEGER NOT NULL,
    path TEXT NOT NULL,
    UNIQUE(tag_id, path)
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_content_updated ON content(updated);
CREATE INDEX IF NOT EXISTS idx_content_disabled ON content(disabled);
CREATE INDEX IF NOT EXISTS idx_playlist_path ON playlist(path);
CREATE INDEX IF NOT EXISTS idx_album_path ON album(path);
CREATE INDEX IF NOT EXISTS idx_taggings_path ON taggings(path);
"#;

const CREATE_FACET_TABLES: &str = r#"
-- Derived per-file facets, keyed by file path
CREATE TABLE IF NOT EXISTS facets (
    path TEXT PRIMARY KEY,
    file TEXT NOT NULL,
    facet_types INTEGER NOT NULL DEFAULT 1,
    data TEXT NOT NULL,
    updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
"#;

impl Database {
    /// Open database at path, creating if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    fn apply_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -16000;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Initialize the content archive schema
    pub fn initialize(&self) -> Result<()> {
        self.apply_pragmas()?;

        self.conn.execute_batch(CREATE_CONTENT_TABLES)?;

        // Run migrations to upgrade existing databases (BEFORE setting version)
        self.migrate()?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Initialize the facets store schema
    pub fn initialize_facets(&self) -> Result<()> {
        self.apply_pragmas()?;
        self.conn.execute_batch(CREATE_FACET_TABLES)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();
        Ok(version)
    }

    /// Run migrations to upgrade schema to current version
    pub fn migrate(&self) -> Result<()> {
        let current = self.schema_version()?.unwrap_or(0);

        if current < 2 {
            self.migrate_to_v2()?;
        }

        Ok(())
    }

    fn migrate_to_v2(&self) -> Result<()> {
        // v1 archives predate the license and keep_formatting columns
        let has_license: bool = self
            .conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('content') WHERE name = 'license'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !has_license {
            self.conn
                .execute("ALTER TABLE content ADD COLUMN license TEXT", [])?;
        }

        let has_keep_formatting: bool = self
            .conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('content') WHERE name = 'keep_formatting'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !has_keep_formatting {
            self.conn.execute(
                "ALTER TABLE content ADD COLUMN keep_formatting INTEGER DEFAULT 0",
                [],
            )?;
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![2],
        )?;

        Ok(())
    }
}
