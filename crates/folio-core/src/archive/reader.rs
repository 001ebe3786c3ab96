//! Reassembly of nested documents from per-table rows

use super::schema::{self, Relation, MAX_DEPTH};
use crate::db::query::quote_ident;
use crate::db::rows::query_documents;
use crate::document::Document;
use crate::error::{FolioError, Result};
use rusqlite::Connection;
use serde_json::Value;

/// Load the rows of `table` for `path` and attach them to `dest[table]`.
///
/// Singular relations attach an object (`null` when the row is missing); many
/// relations attach an array in insertion order. Declared children of `table`
/// are loaded into each attached row.
pub fn fetch(
    conn: &Connection,
    table: &str,
    path: &str,
    dest: &mut Document,
    relation: Relation,
) -> Result<()> {
    fetch_at(conn, table, path, dest, relation, 1)
}

fn fetch_at(
    conn: &Connection,
    table: &str,
    path: &str,
    dest: &mut Document,
    relation: Relation,
    depth: usize,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(FolioError::InvariantViolation(format!(
            "Schema nesting deeper than {} levels at '{}'",
            MAX_DEPTH, table
        )));
    }

    let sql = format!(
        "SELECT * FROM {} WHERE path = ?1 ORDER BY rowid",
        quote_ident(table)?
    );
    let mut rows = query_documents(conn, &sql, [path])?;

    for row in rows.iter_mut() {
        for (child, child_relation) in schema::children(table) {
            fetch_at(conn, child, path, row, *child_relation, depth + 1)?;
        }
    }

    let value = match relation {
        Relation::Singular => rows.into_iter().next().map(Value::Object).unwrap_or(Value::Null),
        Relation::Many => Value::Array(rows.into_iter().map(Value::Object).collect()),
    };
    dest.insert(table.to_string(), value);
    Ok(())
}
