//! Advisory cluster lock on the local file system
//!
//! The lock file holds a TOML `LockRecord` naming the holder. The OS-level
//! exclusive lock is what actually excludes other workflows; the record
//! only tells the loser who to wait for.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use fs2::FileExt;

use crate::domain::entities::LockRecord;
use crate::domain::ports::{ClusterLockGuard, ClusterLocker};
use crate::error::{DeployError, DeployResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct FsClusterLocker;

impl FsClusterLocker {
    pub fn new() -> Self {
        Self
    }
}

/// Releases the OS lock when dropped
struct HeldLock {
    file: File,
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        let _ = self.file.set_len(0);
        let _ = self.file.unlock();
    }
}

fn read_holder(file: &mut File) -> String {
    let mut text = String::new();
    if file.read_to_string(&mut text).is_err() {
        return "unknown holder".to_string();
    }
    toml::from_str::<LockRecord>(&text)
        .map(|record| record.to_string())
        .unwrap_or_else(|_| "unknown holder".to_string())
}

impl ClusterLocker for FsClusterLocker {
    fn acquire(&self, path: &Path, record: LockRecord) -> DeployResult<ClusterLockGuard> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(DeployError::ClusterLocked {
                cluster_id: record.cluster_id,
                holder: read_holder(&mut file),
            });
        }

        let text = toml::to_string(&record)
            .map_err(|e| DeployError::Validation(format!("cannot encode lock record: {}", e)))?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;

        Ok(ClusterLockGuard::new(record, Box::new(HeldLock { file })))
    }
}
