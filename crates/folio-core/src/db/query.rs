//! Small SELECT builder and SQL helpers
//!
//! Identifiers are validated and quoted here; values always travel as bound
//! parameters.

use crate::error::{FolioError, Result};
use rusqlite::types::Value as SqlValue;

/// Quote a table or column name, rejecting anything but `[A-Za-z0-9_]`
pub fn quote_ident(name: &str) -> Result<String> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(format!("\"{}\"", name))
    } else {
        Err(FolioError::InvalidInput(format!(
            "Invalid identifier: {:?}",
            name
        )))
    }
}

/// `column IN (?, ?, ...)` with `n` placeholders
pub fn sql_in(column: &str, n: usize) -> String {
    let placeholders = vec!["?"; n].join(", ");
    format!("{} IN ({})", column, placeholders)
}

/// Convert a JSON scalar into a SQLite value. Booleans become 0/1; nested
/// values are stored as JSON text.
pub fn to_sql_value(value: &serde_json::Value) -> SqlValue {
    use serde_json::Value;
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// SELECT statement under construction
#[derive(Debug, Clone)]
pub struct Select {
    what: Vec<String>,
    sets: String,
    joins: Vec<String>,
    wheres: Vec<String>,
    group: Option<String>,
    order: Vec<String>,
    limit: usize,
    offset: usize,
    params: Vec<SqlValue>,
}

impl Select {
    /// `SELECT * FROM <sets>`
    pub fn new(sets: impl Into<String>) -> Self {
        Self {
            what: vec!["*".to_string()],
            sets: sets.into(),
            joins: Vec::new(),
            wheres: Vec::new(),
            group: None,
            order: Vec::new(),
            limit: 0,
            offset: 0,
            params: Vec::new(),
        }
    }

    pub fn what<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.what = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Add an ANDed condition with its bound parameters
    pub fn filter<I>(mut self, clause: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = SqlValue>,
    {
        self.push_where(clause, params);
        self
    }

    pub fn push_where<I>(&mut self, clause: impl Into<String>, params: I)
    where
        I: IntoIterator<Item = SqlValue>,
    {
        self.wheres.push(clause.into());
        self.params.extend(params);
    }

    pub fn push_join(&mut self, clause: impl Into<String>) {
        self.joins.push(clause.into());
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group = Some(column.into());
        self
    }

    /// Order terms; a leading `-` means descending
    pub fn order<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.order = terms
            .into_iter()
            .map(|t| match t.as_ref().strip_prefix('-') {
                Some(column) => format!("{} DESC", column),
                None => format!("{} ASC", t.as_ref()),
            })
            .collect();
        self
    }

    /// 0 means unlimited
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.what.join(", "), self.sets);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if !self.wheres.is_empty() {
            let clauses: Vec<String> = self.wheres.iter().map(|w| format!("({})", w)).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if let Some(group) = &self.group {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }

        if self.limit > 0 {
            sql.push_str(&format!(" LIMIT {}", self.limit));
        } else if self.offset > 0 {
            sql.push_str(" LIMIT -1");
        }

        if self.offset > 0 {
            sql.push_str(&format!(" OFFSET {}", self.offset));
        }

        sql
    }
}
