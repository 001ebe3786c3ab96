//! Filtered content listing

use super::reader;
use super::schema::{Relation, CONTENT_TABLE};
use super::Archive;
use crate::content_type::ContentType;
use crate::db::query::Select;
use crate::db::rows::query_documents;
use crate::document::ContentRecord;
use crate::error::Result;
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;

/// Default listing order: most recently updated, then most viewed
pub(crate) const CONTENT_ORDER: [&str; 2] = ["-content.updated", "-content.views"];

/// Filters and pagination for [`Archive::get_content`] and [`Archive::get_count`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentQuery {
    /// Free text matched against title, publisher and keywords
    pub terms: Option<String>,
    pub tag: Option<i64>,
    pub language: Option<String>,
    pub content_type: Option<ContentType>,
    pub offset: usize,
    /// 0 means unlimited
    pub limit: usize,
}

impl ContentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }

    pub fn tag(mut self, tag_id: i64) -> Self {
        self.tag = Some(tag_id);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl Archive<'_> {
    fn apply_filters(&self, query: &ContentQuery, mut select: Select) -> Select {
        select.push_where("content.disabled = 0", []);

        if let Some(tag) = query.tag {
            select.push_join("JOIN taggings ON taggings.path = content.path");
            select.push_where("taggings.tag_id = ?", [SqlValue::Integer(tag)]);
        }

        if let Some(language) = &query.language {
            select.push_where("content.language = ?", [SqlValue::Text(language.clone())]);
        }

        if let Some(terms) = query.terms.as_deref().filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", terms.to_lowercase());
            select.push_where(
                "content.title LIKE ? OR content.publisher LIKE ? OR content.keywords LIKE ?",
                std::iter::repeat(SqlValue::Text(pattern)).take(3),
            );
        }

        match query.content_type {
            Some(content_type) => {
                let bit = i64::from(content_type.bit());
                select.push_where(
                    "(content.content_type & ?) = ?",
                    [SqlValue::Integer(bit), SqlValue::Integer(bit)],
                );
            }
            None => {
                // types that cannot be shown on the mixed list
                let mask = self.config.exclude_from_content_list;
                if !mask.is_empty() {
                    let bits = i64::from(mask.bits());
                    select.push_where(
                        "(content.content_type & ?) != ?",
                        [SqlValue::Integer(bits), SqlValue::Integer(bits)],
                    );
                }
            }
        }

        select
    }

    /// Enabled records matching `query`, newest first
    pub fn get_content(&self, query: &ContentQuery) -> Result<Vec<ContentRecord>> {
        let select = Select::new(CONTENT_TABLE)
            .what(["content.*"])
            .order(CONTENT_ORDER)
            .limit(query.limit)
            .offset(query.offset);
        let select = self.apply_filters(query, select);

        let conn = self.conn();
        let mut docs = query_documents(conn, &select.to_sql(), params_from_iter(select.params()))?;

        let prefetch = query
            .content_type
            .filter(|t| self.config.prefetchable_types.contains(t))
            .and_then(ContentType::table);
        if let Some(table) = prefetch {
            for doc in docs.iter_mut() {
                let path = match doc.get("path").and_then(|p| p.as_str()) {
                    Some(path) => path.to_string(),
                    None => continue,
                };
                reader::fetch(conn, table, &path, doc, Relation::Singular)?;
            }
        }

        docs.into_iter().map(ContentRecord::from_document).collect()
    }

    /// Number of enabled records matching `query`, ignoring pagination
    pub fn get_count(&self, query: &ContentQuery) -> Result<usize> {
        let select = self.apply_filters(query, Select::new(CONTENT_TABLE).what(["COUNT(*)"]));
        let count: i64 = self.conn().query_row(
            &select.to_sql(),
            params_from_iter(select.params()),
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
