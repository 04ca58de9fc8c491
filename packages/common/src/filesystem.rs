use crate::error::{CommonError, CommonResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File system abstraction for module resolution and testing
pub trait FileSystem {
    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8
    fn read_to_string(&self, path: &Path) -> CommonResult<String>;

    /// Canonicalize a path (resolve symlinks, make absolute)
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error>;
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error> {
        std::fs::canonicalize(path)
    }
}

/// Mock file system for testing
pub struct MockFileSystem {
    pub files: HashMap<PathBuf, String>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Builder-style variant of [`MockFileSystem::add_file`]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CommonError::NotFound(path.to_path_buf()))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error> {
        // registered paths are already canonical
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_reads_registered_files() {
        let fs = MockFileSystem::new().with_file("/src/app.ts", "export {}");

        assert!(fs.exists(Path::new("/src/app.ts")));
        assert!(!fs.exists(Path::new("/src/other.ts")));
        assert_eq!(
            fs.read_to_string(Path::new("/src/app.ts")).unwrap(),
            "export {}"
        );
    }

    #[test]
    fn test_mock_missing_file_is_not_found() {
        let fs = MockFileSystem::new();
        let err = fs.read_to_string(Path::new("/missing.ts")).unwrap_err();
        assert!(matches!(err, CommonError::NotFound(_)));
    }
}
