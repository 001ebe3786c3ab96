//! Decomposition of nested documents into per-table rows

use super::schema::{self, MAX_DEPTH};
use crate::document::Document;
use crate::error::{FolioError, Result};
use serde_json::Value;

/// One `INSERT OR REPLACE` against `table`
#[derive(Debug, Clone, PartialEq)]
pub struct RowWrite {
    pub table: String,
    pub columns: Document,
}

/// Split `doc` into row writes for `table` and its declared children.
///
/// Nested objects and arrays of objects become rows of the child table named
/// by their key; the remaining scalars plus `shared` become the row of
/// `table`. Children are emitted before their parent.
pub fn decompose(table: &str, doc: &Document, shared: &Document) -> Result<Vec<RowWrite>> {
    let mut writes = Vec::new();
    decompose_into(table, doc, shared, 0, &mut writes)?;
    Ok(writes)
}

fn decompose_into(
    table: &str,
    doc: &Document,
    shared: &Document,
    depth: usize,
    writes: &mut Vec<RowWrite>,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(FolioError::InvariantViolation(format!(
            "Nesting deeper than {} levels under '{}'",
            MAX_DEPTH, table
        )));
    }

    let mut columns = Document::new();

    for (key, value) in doc {
        match value {
            Value::Object(child) => {
                check_child(table, key)?;
                decompose_into(key, child, shared, depth + 1, writes)?;
            }
            Value::Array(items) => {
                check_child(table, key)?;
                for item in items {
                    match item {
                        Value::Object(child) => {
                            decompose_into(key, child, shared, depth + 1, writes)?
                        }
                        other => {
                            return Err(FolioError::InvalidInput(format!(
                                "Entries of '{}' must be objects, got {}",
                                key, other
                            )))
                        }
                    }
                }
            }
            scalar => {
                columns.insert(key.clone(), scalar.clone());
            }
        }
    }

    for (key, value) in shared {
        columns.insert(key.clone(), value.clone());
    }

    writes.push(RowWrite {
        table: table.to_string(),
        columns,
    });
    Ok(())
}

fn check_child(parent: &str, key: &str) -> Result<()> {
    match schema::relation(parent, key) {
        Some(_) => Ok(()),
        None => Err(FolioError::InvalidInput(format!(
            "'{}' is not a sub-entity of '{}'",
            key, parent
        ))),
    }
}
