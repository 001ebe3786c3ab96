//! Database layer for folio
//!
//! Provides SQLite-based storage with:
//! - the content archive (content rows, typed sub-entity tables, tags)
//! - a separate facets store
//! - scoped transactions and on-demand column creation for upserts

mod schema;
pub mod query;
pub(crate) mod rows;

pub use schema::Database;

use crate::archive::writer::RowWrite;
use crate::error::Result;
use query::{quote_ident, to_sql_value};
use rusqlite::{params_from_iter, Connection, Transaction};
use std::collections::HashSet;
use std::path::PathBuf;

impl Database {
    /// Get the default content database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("content.sqlite")
    }

    /// Get the default facets database path
    pub fn default_facets_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("facets.sqlite")
    }

    /// Run `f` inside a transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Execute decomposed row writes as `INSERT OR REPLACE` statements, adding
/// any column a table does not have yet.
pub fn apply_writes(conn: &Connection, writes: &[RowWrite]) -> Result<()> {
    for write in writes {
        if write.columns.is_empty() {
            continue;
        }

        let table = quote_ident(&write.table)?;
        ensure_columns(conn, &write.table, write.columns.keys())?;

        let columns = write
            .columns
            .keys()
            .map(|c| quote_ident(c))
            .collect::<Result<Vec<_>>>()?;
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );

        let values: Vec<_> = write.columns.values().map(to_sql_value).collect();
        conn.execute(&sql, params_from_iter(values))?;
    }
    Ok(())
}

fn ensure_columns<'a>(
    conn: &Connection,
    table: &str,
    wanted: impl Iterator<Item = &'a String>,
) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let existing = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<HashSet<_>, _>>()?;

    for column in wanted {
        if !existing.contains(column) {
            tracing::debug!("Adding column {}.{}", table, column);
            conn.execute(
                &format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    quote_ident(table)?,
                    quote_ident(column)?
                ),
                [],
            )?;
        }
    }
    Ok(())
}
