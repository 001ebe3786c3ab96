//! Built-in facet processors

use super::{find_html_index, FacetProcessor, FacetType};
use crate::document::Document;
use crate::error::Result;
use crate::fsal::{split_name, split_path, Fsal};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

/// Index page stems, highest priority first
pub const INDEX_NAMES: [&str; 4] = ["index", "main", "start", "default"];

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

pub(crate) fn add_facet_type(facets: &mut Document, facet_type: FacetType) {
    let current = facets
        .get("facet_types")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    facets.insert(
        "facet_types".to_string(),
        Value::from(current | facet_type.bit()),
    );
}

fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let title = WHITESPACE_RE.replace_all(raw, " ").trim().to_string();
    (!title.is_empty()).then_some(title)
}

/// Finds the index page of an HTML directory and its title
pub struct HtmlProcessor;

impl FacetProcessor for HtmlProcessor {
    fn facet_type(&self) -> FacetType {
        FacetType::Html
    }

    fn extensions(&self) -> &[&'static str] {
        &["html", "htm"]
    }

    fn process_file(
        &self,
        facets: &mut Document,
        path: &str,
        fsal: &dyn Fsal,
        partial: bool,
    ) -> Result<()> {
        let (parent, fname) = split_path(path);

        let index = if partial {
            fname.to_string()
        } else {
            let siblings: Vec<String> = fsal
                .list_dir(parent)?
                .into_iter()
                .filter(|f| !f.is_dir)
                .map(|f| f.rel_path)
                .collect();
            find_html_index(&siblings).unwrap_or_else(|| fname.to_string())
        };

        let mut html = json!({ "index": index });
        if !partial {
            let index_path = if parent.is_empty() {
                index.clone()
            } else {
                format!("{}/{}", parent, index)
            };
            match fsal.read_to_string(&index_path) {
                Ok(content) => {
                    if let Some(title) = extract_title(&content) {
                        html["title"] = Value::String(title);
                    }
                }
                Err(e) => tracing::debug!("Cannot read '{}' for its title: {}", index_path, e),
            }
        }

        facets.insert("html".to_string(), html);
        add_facet_type(facets, FacetType::Html);
        Ok(())
    }
}

/// Records media files of one kind. Full processing also lists the sibling
/// files of the same kind.
pub struct MediaProcessor {
    facet_type: FacetType,
    extensions: &'static [&'static str],
}

impl MediaProcessor {
    pub fn video() -> Self {
        Self {
            facet_type: FacetType::Video,
            extensions: &["mp4", "webm", "ogv", "mkv", "avi", "mov"],
        }
    }

    pub fn audio() -> Self {
        Self {
            facet_type: FacetType::Audio,
            extensions: &["mp3", "ogg", "oga", "wav", "flac", "m4a"],
        }
    }

    pub fn image() -> Self {
        Self {
            facet_type: FacetType::Image,
            extensions: &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"],
        }
    }

    fn handles(&self, name: &str) -> bool {
        let (_, ext) = split_name(name);
        self.extensions.iter().any(|e| *e == ext)
    }
}

impl FacetProcessor for MediaProcessor {
    fn facet_type(&self) -> FacetType {
        self.facet_type
    }

    fn extensions(&self) -> &[&'static str] {
        self.extensions
    }

    fn process_file(
        &self,
        facets: &mut Document,
        path: &str,
        fsal: &dyn Fsal,
        partial: bool,
    ) -> Result<()> {
        let (parent, fname) = split_path(path);
        let mut entry = json!({ "file": fname });

        if !partial {
            if let Some(fso) = fsal.get_fso(path) {
                entry["size"] = Value::from(fso.size);
                if let Some(modified) = fso.modified {
                    entry["modified"] = Value::String(modified.to_rfc3339());
                }
            }

            let files: Vec<Value> = fsal
                .list_dir(parent)?
                .into_iter()
                .filter(|f| !f.is_dir && self.handles(f.name()))
                .map(|f| Value::String(f.name().to_string()))
                .collect();
            entry["files"] = Value::Array(files);
        }

        facets.insert(self.name().to_string(), entry);
        add_facet_type(facets, self.facet_type);
        Ok(())
    }
}
