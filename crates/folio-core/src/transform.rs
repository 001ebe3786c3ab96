//! Declarative reshaping of raw metadata documents before storage
//!
//! A rule tree is interpreted against a copy of the input document; the input
//! is never mutated. Rules at one level apply in order.

use crate::document::Document;
use serde_json::Value;

/// Action applied to a single key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    /// Pop the key and merge its object fields into the current level.
    /// Merged fields overwrite same-named keys.
    Merge,
    /// Pop and discard the key
    Ignore,
    /// Pop the key and reinsert its value under a new name
    Rename(String),
    /// Recurse into the key's object (or each object of its array)
    Nested(Vec<Rule>),
}

/// A single `(key, action)` rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub key: String,
    pub action: Transformation,
}

impl Rule {
    pub fn new(key: impl Into<String>, action: Transformation) -> Self {
        Self {
            key: key.into(),
            action,
        }
    }

    pub fn merge(key: impl Into<String>) -> Self {
        Self::new(key, Transformation::Merge)
    }

    pub fn ignore(key: impl Into<String>) -> Self {
        Self::new(key, Transformation::Ignore)
    }

    pub fn rename(key: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(key, Transformation::Rename(to.into()))
    }

    pub fn nested(key: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self::new(key, Transformation::Nested(rules))
    }
}

/// Rules the archive applies to incoming metadata
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::merge("content"),
        Rule::ignore("replaces"),
        Rule::nested("video", vec![Rule::rename("size", "resolution")]),
        Rule::nested("image", vec![Rule::rename("size", "resolution")]),
    ]
}

/// Apply `rules` to a copy of `doc`
pub fn serialize(doc: &Document, rules: &[Rule]) -> Document {
    let mut out = doc.clone();
    apply_all(&mut out, rules);
    out
}

fn apply_all(doc: &mut Document, rules: &[Rule]) {
    for rule in rules {
        apply(doc, rule);
    }
}

fn apply(doc: &mut Document, rule: &Rule) {
    match &rule.action {
        Transformation::Merge => {
            if let Some(Value::Object(fields)) = doc.remove(&rule.key) {
                for (key, value) in fields {
                    doc.insert(key, value);
                }
            }
        }
        Transformation::Ignore => {
            doc.remove(&rule.key);
        }
        Transformation::Rename(name) => {
            if let Some(value) = doc.remove(&rule.key) {
                if !value.is_null() {
                    doc.insert(name.clone(), value);
                }
            }
        }
        Transformation::Nested(rules) => match doc.get_mut(&rule.key) {
            Some(Value::Object(child)) => apply_all(child, rules),
            Some(Value::Array(items)) => {
                for item in items.iter_mut() {
                    if let Value::Object(child) = item {
                        apply_all(child, rules);
                    }
                }
            }
            _ => {}
        },
    }
}
