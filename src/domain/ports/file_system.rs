//! FileSystem port - file I/O on the orchestrating machine
//!
//! Conf archives, the properties file and the lock record all live
//! locally; remote hosts are reached through [`super::Session`] instead.

use std::path::{Path, PathBuf};

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug)]
pub enum FsError {
    /// File not found
    NotFound(PathBuf),
    /// Permission denied
    PermissionDenied(PathBuf),
    /// I/O error
    Io(std::io::Error),
    /// Other error
    Other(String),
}

impl FsError {
    /// Classify an I/O error, keeping the path it concerned
    pub fn at(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            _ => FsError::Io(err),
        }
    }
}

impl From<std::io::Error> for FsError {
    fn from(err: std::io::Error) -> Self {
        FsError::at(Path::new(""), err)
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            FsError::PermissionDenied(path) => {
                write!(f, "Permission denied: {}", path.display())
            }
            FsError::Io(err) => write!(f, "I/O error: {}", err),
            FsError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FsError {}

/// Abstract local file system
///
/// Implementations:
/// - `LocalFs` - standard file I/O with atomic writes
pub trait FileSystem: Send + Sync {
    /// Read file content as string
    fn read(&self, path: &Path) -> FsResult<String>;

    /// Write content to file atomically, creating parents
    fn write(&self, path: &Path, content: &str) -> FsResult<()>;

    /// Check if a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file or directory tree; missing paths are fine
    fn remove_all(&self, path: &Path) -> FsResult<()>;

    /// Create directory and parents
    fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Compute content hash (`sha256:<hex>`)
    fn hash(&self, path: &Path) -> FsResult<String>;

    /// Copy every file under `from` into `to`, overwriting same-named
    /// files and leaving others alone. Returns copied paths relative to
    /// `from`, sorted.
    fn copy_tree(&self, from: &Path, to: &Path) -> FsResult<Vec<PathBuf>>;

    /// Names of the direct children of a directory, sorted; a missing
    /// directory has none
    fn list_dir(&self, path: &Path) -> FsResult<Vec<String>>;
}
