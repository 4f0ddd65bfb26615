//! Route directory scanning.
//!
//! # Responsibilities
//! - List module files below the route directory as relative paths
//! - Skip dependency and build-output subtrees
//! - Keep only files with an accepted module extension
//!
//! # Design Decisions
//! - Output is a `BTreeSet`, so every consumer sees sorted paths
//! - The walk runs on the blocking pool; it is the only filesystem I/O
//! - Unreadable entries are logged and skipped, a missing root is an error

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::config::{LayoutConfig, ScanConfig};
use crate::routing::path::RelativePath;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("route directory {0} does not exist")]
    MissingRoot(PathBuf),

    #[error("route directory {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("scan task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Lists the module files of a route directory.
pub trait DirectoryScanner: Send + Sync {
    fn list<'a>(&'a self, root: &'a Path) -> BoxFuture<'a, Result<BTreeSet<RelativePath>, ScanError>>;
}

/// Filesystem scanner backed by walkdir.
#[derive(Debug, Clone)]
pub struct FsScanner {
    extensions: Vec<String>,
    ignore: Vec<String>,
    follow_symlinks: bool,
}

impl FsScanner {
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions,
            ignore: ScanConfig::default().ignore,
            follow_symlinks: false,
        }
    }

    pub fn from_config(layout: &LayoutConfig, scan: &ScanConfig) -> Self {
        Self {
            extensions: layout.extensions.clone(),
            ignore: scan.ignore.clone(),
            follow_symlinks: scan.follow_symlinks,
        }
    }

    /// Set ignored directory names.
    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Set whether to follow symlinks.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.ignore.iter().any(|i| i == name))
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Blocking walk.
    pub fn scan(&self, root: &Path) -> Result<BTreeSet<RelativePath>, ScanError> {
        if !root.exists() {
            return Err(ScanError::MissingRoot(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut paths = BTreeSet::new();
        let walker = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable route entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.matches_extension(entry.path()) {
                continue;
            }
            if let Some(relative) = RelativePath::from_fs(root, entry.path()) {
                paths.insert(relative);
            }
        }

        tracing::debug!(root = %root.display(), files = paths.len(), "Route directory walked");
        Ok(paths)
    }
}

impl DirectoryScanner for FsScanner {
    fn list<'a>(&'a self, root: &'a Path) -> BoxFuture<'a, Result<BTreeSet<RelativePath>, ScanError>> {
        Box::pin(async move {
            let scanner = self.clone();
            let root = root.to_path_buf();
            tokio::task::spawn_blocking(move || scanner.scan(&root)).await?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let users = dir.path().join("users");
        fs::create_dir_all(users.join("admin")).unwrap();
        fs::write(dir.path().join("index.rs"), "").unwrap();
        fs::write(users.join("index.rs"), "").unwrap();
        fs::write(users.join("get_user.rs"), "").unwrap();
        fs::write(users.join("notes.md"), "").unwrap();
        fs::write(users.join("admin").join("index.rs"), "").unwrap();

        let deps = dir.path().join("node_modules").join("pkg");
        fs::create_dir_all(&deps).unwrap();
        fs::write(deps.join("index.rs"), "").unwrap();
        dir
    }

    #[test]
    fn test_scan_filters_and_ignores() {
        let dir = create_test_dir();
        let scanner = FsScanner::new(vec!["rs".into()]);

        let paths: Vec<String> = scanner
            .scan(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.to_string())
            .collect();

        assert_eq!(
            paths,
            vec![
                "index.rs",
                "users/admin/index.rs",
                "users/get_user.rs",
                "users/index.rs",
            ]
        );
    }

    #[test]
    fn test_custom_ignore_list() {
        let dir = create_test_dir();
        let scanner = FsScanner::new(vec!["rs".into()]).with_ignore(vec!["admin".into()]);

        let paths = scanner.scan(dir.path()).unwrap();
        assert!(paths.contains(&RelativePath::new("node_modules/pkg/index.rs")));
        assert!(!paths.contains(&RelativePath::new("users/admin/index.rs")));
    }

    #[test]
    fn test_missing_root() {
        let scanner = FsScanner::new(vec!["rs".into()]);
        let err = scanner.scan(Path::new("/no/such/route/dir")).unwrap_err();
        assert!(matches!(err, ScanError::MissingRoot(_)));
    }

    #[tokio::test]
    async fn test_async_list() {
        let dir = create_test_dir();
        let scanner = FsScanner::new(vec!["rs".into()]);
        let paths = scanner.list(dir.path()).await.unwrap();
        assert_eq!(paths.len(), 4);
    }
}
