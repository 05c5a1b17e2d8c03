use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use crate::{LoadError, SessionError, utils};

/// Where document contents come from
pub trait SourceReader {
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads documents from the local file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystem;

impl SourceReader for FileSystem {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// An opened source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    filename: String,
    contents: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            path,
            filename,
            contents: contents.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name, the final component of the path
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// Documents opened during this session, keyed by absolute path.
///
/// Each path is read at most once while it stays in the cache.
pub struct DocumentCache<R = FileSystem> {
    reader: R,
    project_root: Option<PathBuf>,
    documents: HashMap<PathBuf, Document>,
}

impl DocumentCache<FileSystem> {
    pub fn new() -> Self {
        Self::with_reader(FileSystem)
    }
}

impl Default for DocumentCache<FileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> DocumentCache<R>
where
    R: SourceReader,
{
    pub fn with_reader(reader: R) -> Self {
        Self {
            reader,
            project_root: None,
            documents: HashMap::new(),
        }
    }

    /// Restrict documents to those below `root`. Relative paths resolve against it.
    pub fn with_project_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = utils::absolute_path(root.as_ref(), &working_directory());
        self.project_root = Some(root);
        self
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// The cache key for `path`
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.project_root {
            Some(root) => utils::absolute_path(path, root),
            None => utils::absolute_path(path, &working_directory()),
        }
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.documents.contains_key(&self.resolve(path))
    }

    pub fn get(&self, path: &Path) -> Option<&Document> {
        self.documents.get(&self.resolve(path))
    }

    /// Return the document for `path`, reading it only if it is not cached yet
    #[tracing::instrument(skip(self))]
    pub fn open(&mut self, path: &Path) -> Result<&Document, SessionError> {
        let path = self.resolve(path);

        if let Some(root) = &self.project_root {
            if !path.starts_with(root) {
                return Err(SessionError::DocumentLoad {
                    path,
                    source: LoadError::OutsideProjectRoot(root.clone()),
                });
            }
        }

        if !self.documents.contains_key(&path) {
            tracing::debug!("reading document");
            let contents = self
                .reader
                .read(&path)
                .map_err(|e| SessionError::DocumentLoad {
                    path: path.clone(),
                    source: LoadError::Io(e),
                })?;
            self.documents
                .insert(path.clone(), Document::new(path.clone(), contents));
        }

        Ok(&self.documents[&path])
    }

    /// Drop `path` from the cache so the next open reads it again
    pub fn evict(&mut self, path: &Path) -> Option<Document> {
        let path = self.resolve(path);
        self.documents.remove(&path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.documents.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }
}

fn working_directory() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "cannot determine working directory, using /");
        PathBuf::from("/")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemorySources;

    #[test]
    fn filename_is_last_component() {
        let document = Document::new("/src/index.php", "<?php");
        assert_eq!(document.filename(), "index.php");
        assert_eq!(document.contents(), "<?php");
    }

    #[test]
    fn open_reads_once() {
        let sources = InMemorySources::new().with_file("/src/index.php", "<?php\necho 1;\n");
        let mut cache = DocumentCache::with_reader(sources);

        assert!(!cache.is_open(Path::new("/src/index.php")));
        cache.open(Path::new("/src/index.php")).unwrap();
        cache.open(Path::new("/src/index.php")).unwrap();

        assert!(cache.is_open(Path::new("/src/index.php")));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.reader().reads("/src/index.php"), 1);
    }

    #[test]
    fn equivalent_paths_share_an_entry() {
        let sources = InMemorySources::new().with_file("/src/lib.php", "");
        let mut cache = DocumentCache::with_reader(sources);

        cache.open(Path::new("/src/lib.php")).unwrap();
        cache.open(Path::new("/src/../src/./lib.php")).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.reader().reads("/src/lib.php"), 1);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let mut cache = DocumentCache::with_reader(InMemorySources::new());

        let err = cache.open(Path::new("/src/missing.php")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::DocumentLoad {
                source: LoadError::Io(_),
                ..
            }
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn paths_outside_the_project_root_are_rejected() {
        let sources = InMemorySources::new().with_file("/etc/passwd", "root");
        let mut cache = DocumentCache::with_reader(sources).with_project_root("/src");

        let err = cache.open(Path::new("/src/../etc/passwd")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::DocumentLoad {
                source: LoadError::OutsideProjectRoot(_),
                ..
            }
        ));
        assert_eq!(cache.reader().reads("/etc/passwd"), 0);
    }

    #[test]
    fn relative_paths_resolve_against_the_project_root() {
        let sources = InMemorySources::new().with_file("/src/index.php", "<?php");
        let mut cache = DocumentCache::with_reader(sources).with_project_root("/src");

        let document = cache.open(Path::new("index.php")).unwrap();
        assert_eq!(document.path(), Path::new("/src/index.php"));
    }

    #[test]
    fn evicted_documents_are_read_again() {
        let sources = InMemorySources::new().with_file("/src/index.php", "<?php");
        let mut cache = DocumentCache::with_reader(sources);

        cache.open(Path::new("/src/index.php")).unwrap();
        assert!(cache.evict(Path::new("/src/index.php")).is_some());
        cache.open(Path::new("/src/index.php")).unwrap();

        assert_eq!(cache.reader().reads("/src/index.php"), 2);
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.php");
        std::fs::write(&path, "<?php\n").unwrap();

        let mut cache = DocumentCache::new();
        let document = cache.open(&path).unwrap();
        assert_eq!(document.contents(), "<?php\n");
        assert_eq!(document.filename(), "index.php");
    }
}
