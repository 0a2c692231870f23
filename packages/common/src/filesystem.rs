use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CommonError;
use crate::result::CommonResult;

/// File capability object injected into the synchronizer.
///
/// The board engine never reaches for ambient host state; everything that
/// touches the document file goes through this trait so tests can swap in
/// an in-memory implementation.
pub trait FileSystem: Send + Sync {
    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Read the full contents of a file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> CommonResult<String>;

    /// Replace the contents of a file, creating it if missing
    fn write(&self, path: &Path, contents: &str) -> CommonResult<()>;

    /// Canonicalize a path (resolve symlinks, make absolute)
    fn canonicalize(&self, path: &Path) -> CommonResult<PathBuf>;
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> CommonResult<()> {
        Ok(std::fs::write(path, contents)?)
    }

    fn canonicalize(&self, path: &Path) -> CommonResult<PathBuf> {
        Ok(std::fs::canonicalize(path)?)
    }
}

/// In-memory file system for testing
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let fs = Self::new();
        fs.add_file(path.into(), contents.into());
        fs
    }

    pub fn add_file(&self, path: PathBuf, contents: String) {
        self.files.lock().unwrap().insert(path, contents);
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| CommonError::FileNotFound(path.display().to_string()))
    }

    fn write(&self, path: &Path, contents: &str) -> CommonResult<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> CommonResult<PathBuf> {
        // For the in-memory store, paths are already canonical
        Ok(path.to_path_buf())
    }
}
