//! Tags and taggings

use super::Archive;
use crate::db::query::{sql_in, Select};
use crate::document::ContentRecord;
use crate::error::Result;
use rusqlite::{params, params_from_iter, OptionalExtension};
use serde::Serialize;

/// A tag row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub tag_id: i64,
    pub name: String,
}

/// Tag with the number of records carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag_id: i64,
    pub name: String,
    pub count: i64,
}

fn normalize<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

impl Archive<'_> {
    /// Attach tags to a record, creating missing tags. Returns the tags
    /// that were attached.
    pub fn add_tags<S: AsRef<str>>(
        &self,
        record: &mut ContentRecord,
        names: &[S],
    ) -> Result<Vec<Tag>> {
        let names = normalize(names);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        self.db.transaction(|tx| {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO tags (name) VALUES (?1)")?;
            for name in &names {
                stmt.execute([name])?;
            }
            Ok(())
        })?;

        let select = Select::new("tags")
            .what(["tag_id", "name"])
            .filter(sql_in("name", names.len()), [])
            .order(["tag_id"]);
        let mut stmt = self.conn().prepare(&select.to_sql())?;
        let tags = stmt
            .query_map(params_from_iter(&names), |row| {
                Ok(Tag {
                    tag_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        drop(stmt);

        let mut mapping = record.tags();
        for tag in &tags {
            mapping.insert(tag.name.clone(), tag.tag_id);
        }
        let serialized = serde_json::to_string(&mapping)?;
        let path = record.path().to_string();

        self.db.transaction(|tx| {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO taggings (tag_id, path) VALUES (?1, ?2)")?;
            for tag in &tags {
                stmt.execute(params![tag.tag_id, path])?;
            }
            tx.execute(
                "UPDATE content SET tags = ?1 WHERE path = ?2",
                params![serialized, path],
            )?;
            Ok(())
        })?;

        record.set_tags(&mapping)?;
        Ok(tags)
    }

    /// Detach tags from a record. Names the record does not carry are
    /// ignored. Returns the number of taggings removed.
    pub fn remove_tags<S: AsRef<str>>(
        &self,
        record: &mut ContentRecord,
        names: &[S],
    ) -> Result<usize> {
        let names = normalize(names);
        let mut mapping = record.tags();
        let tag_ids: Vec<i64> = names.iter().filter_map(|n| mapping.remove(n)).collect();
        if tag_ids.is_empty() {
            return Ok(0);
        }

        let serialized = serde_json::to_string(&mapping)?;
        let path = record.path().to_string();
        let sql = format!(
            "DELETE FROM taggings WHERE path = ? AND {}",
            sql_in("tag_id", tag_ids.len())
        );

        let removed = self.db.transaction(|tx| {
            let mut values: Vec<rusqlite::types::Value> = vec![path.clone().into()];
            values.extend(tag_ids.iter().map(|id| rusqlite::types::Value::Integer(*id)));
            let removed = tx.execute(&sql, params_from_iter(values))?;
            tx.execute(
                "UPDATE content SET tags = ?1 WHERE path = ?2",
                params![serialized, path],
            )?;
            Ok(removed)
        })?;

        record.set_tags(&mapping)?;
        Ok(removed)
    }

    pub fn get_tag_name(&self, tag_id: i64) -> Result<Option<String>> {
        let name = self
            .conn()
            .query_row("SELECT name FROM tags WHERE tag_id = ?1", [tag_id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(name)
    }

    /// Tags in use, most used first
    pub fn get_tag_cloud(&self) -> Result<Vec<TagCount>> {
        let select = Select::new("tags")
            .what(["tags.tag_id", "tags.name", "COUNT(taggings.tag_id) AS count"])
            .join("JOIN taggings ON taggings.tag_id = tags.tag_id")
            .group_by("tags.tag_id")
            .order(["-count", "tags.name"]);

        let mut stmt = self.conn().prepare(&select.to_sql())?;
        let results = stmt
            .query_map([], |row| {
                Ok(TagCount {
                    tag_id: row.get(0)?,
                    name: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }
}
