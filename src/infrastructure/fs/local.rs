//! Local File System Implementation
//!
//! Implements the FileSystem port for local disk operations.

use std::io::Write;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use sha2::{Digest, Sha256};

use crate::domain::ports::file_system::{FileSystem, FsError, FsResult};

/// Local file system implementation
///
/// Writes go to a temp file in the target directory and are renamed into
/// place, so readers never see a half-written properties file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }

    fn atomic_write(path: &Path, content: &[u8]) -> FsResult<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| FsError::at(dir, e))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| FsError::at(dir, e))?;
        tmp.write_all(content).map_err(|e| FsError::at(path, e))?;
        tmp.as_file().sync_all().map_err(|e| FsError::at(path, e))?;
        tmp.persist(path).map_err(|e| FsError::at(path, e.error))?;
        Ok(())
    }
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> FsResult<String> {
        std::fs::read_to_string(path).map_err(|e| FsError::at(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> FsResult<()> {
        Self::atomic_write(path, content.as_bytes())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_all(&self, path: &Path) -> FsResult<()> {
        let result = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FsError::at(path, e)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        std::fs::create_dir_all(path).map_err(|e| FsError::at(path, e))
    }

    fn hash(&self, path: &Path) -> FsResult<String> {
        let bytes = std::fs::read(path).map_err(|e| FsError::at(path, e))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("sha256:{:x}", hasher.finalize()))
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> FsResult<Vec<PathBuf>> {
        if !from.is_dir() {
            return Err(FsError::NotFound(from.to_path_buf()));
        }
        let walker = WalkBuilder::new(from)
            .standard_filters(false)
            .hidden(false)
            .follow_links(false)
            .build();

        let mut copied = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| FsError::Other(e.to_string()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| FsError::Other(e.to_string()))?
                .to_path_buf();
            let target = to.join(&relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| FsError::at(parent, e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| FsError::at(&target, e))?;
            copied.push(relative);
        }
        copied.sort();
        Ok(copied)
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<String>> {
        let entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FsError::at(path, e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::at(path, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}
