//! Row to document conversion

use crate::document::Document;
use crate::error::Result;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Params, Row};
use serde_json::Value;

/// Convert a row into a document keyed by column name. NULL columns are
/// omitted.
pub fn row_to_document(row: &Row<'_>, columns: &[String]) -> rusqlite::Result<Document> {
    let mut doc = Document::new();
    for (idx, name) in columns.iter().enumerate() {
        let value = match row.get_ref(idx)? {
            ValueRef::Null => continue,
            ValueRef::Integer(i) => Value::from(i),
            ValueRef::Real(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Value::String(String::from_utf8_lossy(t).into_owned())
            }
        };
        doc.insert(name.clone(), value);
    }
    Ok(doc)
}

/// Run a query and collect every row as a document
pub fn query_documents<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Document>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let results = stmt
        .query_map(params, |row| row_to_document(row, &columns))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(results)
}

/// Run a query and return the first row, if any
pub fn query_document<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Option<Document>> {
    Ok(query_documents(conn, sql, params)?.into_iter().next())
}
