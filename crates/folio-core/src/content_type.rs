//! Content type bitmask table
//!
//! Every named content type owns a distinct bit. A content record stores the
//! union of the bits of the typed sub-entities it carries in `content_type`.

use crate::document::Document;
use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// Named content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Generic,
    Html,
    Video,
    Audio,
    App,
    Image,
}

impl ContentType {
    /// All known content types, in bit order
    pub const ALL: [ContentType; 6] = [
        ContentType::Generic,
        ContentType::Html,
        ContentType::Video,
        ContentType::Audio,
        ContentType::App,
        ContentType::Image,
    ];

    /// Bit value of this type
    pub fn bit(self) -> u32 {
        match self {
            ContentType::Generic => 1,
            ContentType::Html => 2,
            ContentType::Video => 4,
            ContentType::Audio => 8,
            ContentType::App => 16,
            ContentType::Image => 32,
        }
    }

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            ContentType::Generic => "generic",
            ContentType::Html => "html",
            ContentType::Video => "video",
            ContentType::Audio => "audio",
            ContentType::App => "app",
            ContentType::Image => "image",
        }
    }

    /// Backing sub-entity table, if any. `generic` is virtual.
    pub fn table(self) -> Option<&'static str> {
        match self {
            ContentType::Generic => None,
            other => Some(other.name()),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentType {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        ContentType::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .ok_or_else(|| FolioError::InvalidInput(format!("Unknown content type: {}", s)))
    }
}

/// Bitmask of content types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTypes(u32);

impl ContentTypes {
    /// Empty mask
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wrap raw bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits
    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `(mask & bit) == bit`
    pub fn contains(self, content_type: ContentType) -> bool {
        self.0 & content_type.bit() == content_type.bit()
    }

    pub fn insert(&mut self, content_type: ContentType) {
        self.0 |= content_type.bit();
    }

    /// Known types whose bit is set
    pub fn iter(self) -> impl Iterator<Item = ContentType> {
        ContentType::ALL.into_iter().filter(move |t| self.contains(*t))
    }

    /// Parse a list of type names into a mask
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|n| n.as_ref().parse::<ContentType>())
            .collect()
    }

    /// Union of the types whose sub-entity is present as an object in `doc`
    pub fn from_document(doc: &Document) -> Self {
        ContentType::ALL
            .into_iter()
            .filter(|t| {
                t.table()
                    .and_then(|table| doc.get(table))
                    .is_some_and(Value::is_object)
            })
            .collect()
    }
}

impl From<ContentType> for ContentTypes {
    fn from(content_type: ContentType) -> Self {
        Self(content_type.bit())
    }
}

impl BitOr for ContentTypes {
    type Output = ContentTypes;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl FromIterator<ContentType> for ContentTypes {
    fn from_iter<T: IntoIterator<Item = ContentType>>(iter: T) -> Self {
        let mut mask = ContentTypes::empty();
        for content_type in iter {
            mask.insert(content_type);
        }
        mask
    }
}
