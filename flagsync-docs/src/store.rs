//! Document storage collaborator.
//!
//! The pipeline depends on the [`DocumentStore`] trait so tests can swap in
//! fakes; [`FsStore`] is the production filesystem implementation.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{io_err, DocError};

/// Narrow storage capability consumed by the sync pipeline.
pub trait DocumentStore {
    /// Every markdown file under the given roots, sorted for deterministic
    /// scan order. Roots that do not exist are skipped with a warning.
    fn list_markdown_files(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>, DocError>;

    fn read(&self, path: &Path) -> Result<String, DocError>;

    fn write(&self, path: &Path, text: &str) -> Result<(), DocError>;

    fn exists(&self, path: &Path) -> bool;
}

/// Filesystem-backed document store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl DocumentStore for FsStore {
    fn list_markdown_files(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>, DocError> {
        let mut files = Vec::new();
        for root in roots {
            if !root.exists() {
                log::warn!("doc root {} does not exist; skipping", root.display());
                continue;
            }
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    match e.into_io_error() {
                        Some(io) => io_err(path, io),
                        None => io_err(path, std::io::Error::other("walkdir loop")),
                    }
                })?;
                let path = entry.path();
                if entry.file_type().is_file()
                    && path.extension().is_some_and(|ext| ext == "md")
                {
                    files.push(path.to_path_buf());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<String, DocError> {
        std::fs::read_to_string(path).map_err(|e| io_err(path, e))
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), DocError> {
        std::fs::write(path, text).map_err(|e| io_err(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn lists_only_markdown_recursively_and_sorted() {
        let root = TempDir::new().expect("root");
        let nested = root.path().join("features").join("checkout");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(root.path().join("b.md"), "b").expect("write");
        fs::write(root.path().join("a.md"), "a").expect("write");
        fs::write(root.path().join("notes.txt"), "x").expect("write");
        fs::write(nested.join("flags.md"), "f").expect("write");

        let files = FsStore
            .list_markdown_files(&[root.path().to_path_buf()])
            .expect("list");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md", "features/checkout/flags.md"]);
    }

    #[test]
    fn missing_root_is_skipped_not_fatal() {
        let root = TempDir::new().expect("root");
        let missing = root.path().join("nope");
        let files = FsStore.list_markdown_files(&[missing]).expect("list");
        assert!(files.is_empty());
    }

    #[test]
    fn read_missing_file_annotates_path() {
        let root = TempDir::new().expect("root");
        let path = root.path().join("gone.md");
        let err = FsStore.read(&path).expect_err("missing");
        assert!(err.to_string().contains("gone.md"));
    }
}
