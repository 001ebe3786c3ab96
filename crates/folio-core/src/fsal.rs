//! Filesystem abstraction layer
//!
//! All paths handed to an [`Fsal`] are relative to its content root and use
//! `/` as separator.

use crate::error::{FolioError, Result};
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A file or directory under the content root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsObject {
    pub rel_path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl FsObject {
    /// Final path component
    pub fn name(&self) -> &str {
        split_path(&self.rel_path).1
    }
}

/// Access to the content directory
pub trait Fsal: Send + Sync {
    /// Look up a single entry; `None` when it does not exist
    fn get_fso(&self, path: &str) -> Option<FsObject>;

    /// Entries directly inside a directory, sorted by name
    fn list_dir(&self, path: &str) -> Result<Vec<FsObject>>;

    fn read_to_string(&self, path: &str) -> Result<String>;

    /// Every file under the root
    fn walk_files(&self) -> Result<Vec<FsObject>>;
}

/// `("a/b", "c.txt")` for `"a/b/c.txt"`; the parent is empty at the root
pub fn split_path(path: &str) -> (&str, &str) {
    let path = path.trim_end_matches('/');
    match path.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", path),
    }
}

/// `("index", "html")` for `"index.HTML"`; the extension is lowercased
pub fn split_name(name: &str) -> (&str, String) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, ext.to_lowercase()),
        _ => (name, String::new()),
    }
}

/// [`Fsal`] over a local directory
#[derive(Debug, Clone)]
pub struct LocalFsal {
    root: PathBuf,
}

impl LocalFsal {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let rel = Path::new(path.trim_start_matches('/'));
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FolioError::InvalidInput(format!(
                "Path escapes content root: {}",
                path
            )));
        }
        Ok(self.root.join(rel))
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| path.to_string_lossy().to_string())
    }

    fn to_fso(&self, path: &Path, metadata: &std::fs::Metadata) -> FsObject {
        FsObject {
            rel_path: self.relative(path),
            is_dir: metadata.is_dir(),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}

impl Fsal for LocalFsal {
    fn get_fso(&self, path: &str) -> Option<FsObject> {
        let full = self.resolve(path).ok()?;
        let metadata = std::fs::metadata(&full).ok()?;
        Some(self.to_fso(&full, &metadata))
    }

    fn list_dir(&self, path: &str) -> Result<Vec<FsObject>> {
        let full = self.resolve(path)?;
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&full)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(self.to_fso(&entry.path(), &metadata));
        }
        entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Ok(entries)
    }

    fn read_to_string(&self, path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.resolve(path)?)?)
    }

    fn walk_files(&self) -> Result<Vec<FsObject>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !should_skip(e));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let metadata = entry.metadata()?;
            files.push(self.to_fso(entry.path(), &metadata));
        }
        Ok(files)
    }
}

fn should_skip(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, LocalFsal) {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("site/css")).unwrap();
        std::fs::create_dir_all(temp.path().join(".hidden")).unwrap();
        std::fs::write(temp.path().join("site/index.html"), "<html></html>").unwrap();
        std::fs::write(temp.path().join("site/css/style.css"), "body {}").unwrap();
        std::fs::write(temp.path().join(".hidden/secret"), "x").unwrap();
        let fsal = LocalFsal::new(temp.path());
        (temp, fsal)
    }

    #[test]
    fn test_split_helpers() {
        assert_eq!(split_path("a/b/c.txt"), ("a/b", "c.txt"));
        assert_eq!(split_path("c.txt"), ("", "c.txt"));
        assert_eq!(split_name("index.HTML"), ("index", "html".to_string()));
        assert_eq!(split_name("README"), ("README", String::new()));
        assert_eq!(split_name(".bashrc"), (".bashrc", String::new()));
    }

    #[test]
    fn test_get_fso() {
        let (_temp, fsal) = fixture();
        let fso = fsal.get_fso("site/index.html").unwrap();
        assert_eq!(fso.rel_path, "site/index.html");
        assert_eq!(fso.name(), "index.html");
        assert_eq!(fso.size, 13);
        assert!(!fso.is_dir);
        assert!(fsal.get_fso("site").unwrap().is_dir);
        assert!(fsal.get_fso("missing.html").is_none());
        assert!(fsal.get_fso("../etc/passwd").is_none());
    }

    #[test]
    fn test_list_dir_and_walk() {
        let (_temp, fsal) = fixture();
        let names: Vec<_> = fsal
            .list_dir("site")
            .unwrap()
            .into_iter()
            .map(|f| f.rel_path)
            .collect();
        assert_eq!(names, vec!["site/css", "site/index.html"]);

        let files: Vec<_> = fsal
            .walk_files()
            .unwrap()
            .into_iter()
            .map(|f| f.rel_path)
            .collect();
        assert_eq!(files, vec!["site/css/style.css", "site/index.html"]);
    }

    #[test]
    fn test_read_rejects_escape() {
        let (_temp, fsal) = fixture();
        assert_eq!(fsal.read_to_string("site/css/style.css").unwrap(), "body {}");
        assert!(matches!(
            fsal.read_to_string("../outside"),
            Err(FolioError::InvalidInput(_))
        ));
    }
}
