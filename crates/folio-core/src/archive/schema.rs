//! Static content schema graph
//!
//! Maps each table to the sub-entity tables it owns and how they relate.

/// How a child table relates to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// At most one row per path; attached as an object
    Singular,
    /// Any number of rows per path; attached as an array in rowid order
    Many,
}

/// Root table of the archive
pub const CONTENT_TABLE: &str = "content";

/// Recursion limit for reading and writing nested entities
pub const MAX_DEPTH: usize = 8;

const SCHEMA: &[(&str, &[(&str, Relation)])] = &[
    (
        CONTENT_TABLE,
        &[
            ("html", Relation::Singular),
            ("video", Relation::Singular),
            ("audio", Relation::Singular),
            ("app", Relation::Singular),
            ("image", Relation::Singular),
        ],
    ),
    ("html", &[]),
    ("video", &[]),
    ("audio", &[("playlist", Relation::Many)]),
    ("app", &[]),
    ("image", &[("album", Relation::Many)]),
    ("playlist", &[]),
    ("album", &[]),
];

/// Children declared for `table`
pub fn children(table: &str) -> &'static [(&'static str, Relation)] {
    SCHEMA
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, children)| *children)
        .unwrap_or(&[])
}

/// Relation of `child` under `parent`, if declared
pub fn relation(parent: &str, child: &str) -> Option<Relation> {
    children(parent)
        .iter()
        .find(|(name, _)| *name == child)
        .map(|(_, relation)| *relation)
}

pub fn is_known_table(table: &str) -> bool {
    SCHEMA.iter().any(|(name, _)| *name == table)
}

/// Every table except `content`, parents before children
pub fn subtables() -> impl Iterator<Item = &'static str> {
    SCHEMA
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| *name != CONTENT_TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relations() {
        assert_eq!(relation("content", "video"), Some(Relation::Singular));
        assert_eq!(relation("audio", "playlist"), Some(Relation::Many));
        assert_eq!(relation("image", "album"), Some(Relation::Many));
        assert_eq!(relation("content", "playlist"), None);
        assert!(children("video").is_empty());
        assert!(children("unknown").is_empty());
    }

    #[test]
    fn test_subtables() {
        let tables: Vec<_> = subtables().collect();
        assert_eq!(
            tables,
            vec!["html", "video", "audio", "app", "image", "playlist", "album"]
        );
        assert!(is_known_table("album"));
        assert!(!is_known_table("tags"));
    }

    #[test]
    fn test_schema_is_acyclic() {
        fn depth(table: &str, level: usize) -> usize {
            assert!(level <= MAX_DEPTH, "cycle through {}", table);
            children(table)
                .iter()
                .map(|(child, _)| depth(child, level + 1))
                .max()
                .unwrap_or(level)
        }
        assert_eq!(depth(CONTENT_TABLE, 0), 2);
    }
}
