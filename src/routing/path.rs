//! Relative module paths.

use std::fmt;
use std::path::Path;

/// Slash-delimited path of a module below the route directory.
///
/// Always uses `/`, never has a leading `./` or `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath(String);

impl RelativePath {
    pub fn new(path: impl AsRef<str>) -> Self {
        let normalized = path.as_ref().replace('\\', "/");
        let mut trimmed = normalized.as_str();
        loop {
            if let Some(rest) = trimmed.strip_prefix("./") {
                trimmed = rest;
            } else if let Some(rest) = trimmed.strip_prefix('/') {
                trimmed = rest;
            } else {
                break;
            }
        }
        Self(trimmed.to_string())
    }

    /// Path of `full` relative to `root`, if it lies below it.
    pub fn from_fs(root: &Path, full: &Path) -> Option<Self> {
        let relative = full.strip_prefix(root).ok()?;
        let segments: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        if segments.is_empty() {
            return None;
        }
        Some(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Final segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelativePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for RelativePath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalization() {
        assert_eq!(RelativePath::new("./users/index.rs").as_str(), "users/index.rs");
        assert_eq!(RelativePath::new("/users/index.rs").as_str(), "users/index.rs");
        assert_eq!(RelativePath::new("users\\get_user.rs").as_str(), "users/get_user.rs");
    }

    #[test]
    fn test_file_name_and_segments() {
        let path = RelativePath::new("api/users/index.rs");
        assert_eq!(path.file_name(), "index.rs");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["api", "users", "index.rs"]);
    }

    #[test]
    fn test_from_fs() {
        let root = PathBuf::from("/srv/routes");
        let full = root.join("users").join("index.rs");
        assert_eq!(
            RelativePath::from_fs(&root, &full),
            Some(RelativePath::new("users/index.rs"))
        );
        assert_eq!(RelativePath::from_fs(&root, &root), None);
        assert_eq!(RelativePath::from_fs(&root, Path::new("/etc/passwd")), None);
    }
}
