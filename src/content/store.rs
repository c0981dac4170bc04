//! Content stores - the durable source records are read from

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::ContentError;

lazy_static! {
    /// Category names map straight onto directories, so keep them to one plain segment
    static ref CATEGORY_NAME: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap();
}

/// A raw stored document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Stable name the slug is derived from
    pub identifier: String,
    /// Where the record came from, for logs and errors
    pub source: String,
    /// Front-matter followed by the body
    pub text: String,
}

/// One record, or the reason it could not be read
pub type RecordResult = Result<Record, ContentError>;

/// A read-only set of documents grouped by category
pub trait ContentStore: Send + Sync {
    /// Names of all known categories, sorted
    fn categories(&self) -> Result<Vec<String>, ContentError>;

    /// All records of a category; `NotFound` if the category does not exist
    fn records(&self, category: &str) -> Result<Vec<RecordResult>, ContentError>;
}

/// Check that a category name is a single plain path segment
pub fn is_valid_category(name: &str) -> bool {
    CATEGORY_NAME.is_match(name)
}

/// Store backed by a directory tree: one subdirectory per category
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn read_record(&self, path: &Path, category_dir: &Path) -> RecordResult {
        let source = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let text = fs::read_to_string(path)
            .map_err(|e| ContentError::malformed(&source, format!("unreadable: {}", e)))?;

        let identifier = record_identifier(path, category_dir)
            .ok_or_else(|| ContentError::malformed(&source, "file name is not valid UTF-8"))?;

        Ok(Record {
            identifier,
            source,
            text,
        })
    }
}

impl ContentStore for FsStore {
    fn categories(&self) -> Result<Vec<String>, ContentError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut categories = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_valid_category(name) {
                    categories.push(name.to_string());
                }
            }
        }

        categories.sort();
        Ok(categories)
    }

    fn records(&self, category: &str) -> Result<Vec<RecordResult>, ContentError> {
        if !is_valid_category(category) {
            return Err(ContentError::not_found(category));
        }

        let category_dir = self.root.join(category);
        if !category_dir.is_dir() {
            return Err(ContentError::not_found(category));
        }

        let mut records = Vec::new();

        for entry in WalkDir::new(&category_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    records.push(Err(ContentError::Io(e.into())));
                    continue;
                }
            };

            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                tracing::debug!("Reading {:?}", path);
                records.push(self.read_record(path, &category_dir));
            }
        }

        Ok(records)
    }
}

/// `foo.md` is `foo`, and so is `foo/index.md`
fn record_identifier(path: &Path, category_dir: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if stem == "index" {
        if let Some(parent) = path.parent().filter(|p| *p != category_dir) {
            return parent.file_name()?.to_str().map(str::to_string);
        }
    }
    Some(stem.to_string())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// In-memory store, for embedded content and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    categories: BTreeMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty category
    pub fn with_category(mut self, category: &str) -> Self {
        self.categories.entry(category.to_string()).or_default();
        self
    }

    /// Add a record, creating its category if needed
    pub fn with_record(mut self, category: &str, identifier: &str, text: &str) -> Self {
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(Record {
                identifier: identifier.to_string(),
                source: format!("{}/{}", category, identifier),
                text: text.to_string(),
            });
        self
    }
}

impl ContentStore for MemoryStore {
    fn categories(&self) -> Result<Vec<String>, ContentError> {
        Ok(self.categories.keys().cloned().collect())
    }

    fn records(&self, category: &str) -> Result<Vec<RecordResult>, ContentError> {
        self.categories
            .get(category)
            .map(|records| records.iter().cloned().map(Ok).collect())
            .ok_or_else(|| ContentError::not_found(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, text: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn identifiers(records: Vec<RecordResult>) -> Vec<String> {
        records
            .into_iter()
            .map(|r| r.unwrap().identifier)
            .collect()
    }

    #[test]
    fn test_category_names() {
        assert!(is_valid_category("posts"));
        assert!(is_valid_category("notes_2024"));
        assert!(!is_valid_category(""));
        assert!(!is_valid_category(".."));
        assert!(!is_valid_category("posts/../etc"));
        assert!(!is_valid_category(".hidden"));
    }

    #[test]
    fn test_fs_store_lists_categories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("posts")).unwrap();
        fs::create_dir_all(tmp.path().join("notes")).unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        write(tmp.path(), "README.md", "not a category");

        let store = FsStore::new(tmp.path());
        assert_eq!(store.categories().unwrap(), vec!["notes", "posts"]);
    }

    #[test]
    fn test_fs_store_missing_root_has_no_categories() {
        let tmp = TempDir::new().unwrap();
        let store = FsStore::new(tmp.path().join("nope"));
        assert!(store.categories().unwrap().is_empty());
    }

    #[test]
    fn test_fs_store_reads_markdown_records() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "posts/hello.md", "---\ntitle: Hello\n---\n");
        write(tmp.path(), "posts/nested/index.md", "---\ntitle: Nested\n---\n");
        write(tmp.path(), "posts/older.markdown", "---\ntitle: Older\n---\n");
        write(tmp.path(), "posts/image.png", "binary");
        write(tmp.path(), "posts/.draft.md", "hidden");

        let store = FsStore::new(tmp.path());
        let ids = identifiers(store.records("posts").unwrap());
        assert_eq!(ids, vec!["hello", "nested", "older"]);
    }

    #[test]
    fn test_fs_store_record_source_is_relative() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "posts/hello.md", "text");

        let store = FsStore::new(tmp.path());
        let record = store.records("posts").unwrap().pop().unwrap().unwrap();
        assert_eq!(Path::new(&record.source), Path::new("posts/hello.md"));
        assert_eq!(record.text, "text");
    }

    #[test]
    fn test_fs_store_unknown_category() {
        let tmp = TempDir::new().unwrap();
        let store = FsStore::new(tmp.path());
        let err = store.records("posts").unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));

        let err = store.records("../outside").unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
    }

    #[test]
    fn test_fs_store_empty_category() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("posts")).unwrap();
        let store = FsStore::new(tmp.path());
        assert!(store.records("posts").unwrap().is_empty());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new()
            .with_category("notes")
            .with_record("posts", "a", "text");
        assert_eq!(store.categories().unwrap(), vec!["notes", "posts"]);
        assert!(store.records("notes").unwrap().is_empty());
        assert_eq!(identifiers(store.records("posts").unwrap()), vec!["a"]);
        assert!(store.records("missing").is_err());
    }
}
