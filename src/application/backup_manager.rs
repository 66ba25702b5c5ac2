//! Backup/restore manager
//!
//! Conf archives live on the orchestrating machine under
//! `conf_backup_root`; data archives live on each host under
//! `data_backup_root`. An archive directory is created fresh and never
//! written to again; restore copies files back over the conf directory
//! without deleting anything else.

use std::path::PathBuf;

use crate::domain::entities::{BackupArchive, BackupKind, BackupTag, ClusterPaths};
use crate::domain::ports::{FileSystem, FsError, Session};
use crate::domain::value_objects::{ClusterId, Phase};
use crate::error::{DeployError, DeployResult};

pub struct BackupManager<'a> {
    fs: &'a dyn FileSystem,
    paths: &'a ClusterPaths,
    cluster_id: ClusterId,
}

impl<'a> BackupManager<'a> {
    pub fn new(fs: &'a dyn FileSystem, paths: &'a ClusterPaths, cluster_id: ClusterId) -> Self {
        Self {
            fs,
            paths,
            cluster_id,
        }
    }

    pub fn conf_archive_path(&self, tag: &BackupTag) -> PathBuf {
        let archive = BackupArchive::new(self.cluster_id, BackupKind::Conf, tag.clone());
        self.paths.conf_backup_root.join(archive.dir_name())
    }

    pub fn data_archive_path(&self, tag: &BackupTag) -> PathBuf {
        let archive = BackupArchive::new(self.cluster_id, BackupKind::Data, tag.clone());
        self.paths.data_backup_root.join(archive.dir_name())
    }

    /// Archive the local conf directory
    pub fn backup_conf(&self, tag: &BackupTag) -> DeployResult<PathBuf> {
        let target = self.conf_archive_path(tag);
        if self.fs.exists(&target) {
            return Err(DeployError::BackupExists { path: target });
        }
        if !self.fs.exists(&self.paths.conf_path) {
            return Err(FsError::NotFound(self.paths.conf_path.clone()).into());
        }
        self.fs.create_dir_all(&target)?;
        self.fs.copy_tree(&self.paths.conf_path, &target)?;
        Ok(target)
    }

    /// Archive the cluster directory on the session's host.
    ///
    /// Returns `None` when the host has no cluster directory to save.
    pub fn backup_cluster(
        &self,
        session: &dyn Session,
        tag: &BackupTag,
        phase: Phase,
    ) -> DeployResult<Option<PathBuf>> {
        let host = session.host().clone();
        let remote = |e| DeployError::remote(phase, &host, e);

        if !session.exists(&self.paths.cluster_path).map_err(remote)? {
            return Ok(None);
        }
        let target = self.data_archive_path(tag);
        if session.exists(&target).map_err(remote)? {
            return Err(DeployError::BackupExists { path: target });
        }
        session
            .create_dir_all(&self.paths.data_backup_root)
            .map_err(remote)?;
        session
            .copy_remote(&self.paths.cluster_path, &target)
            .map_err(remote)?;
        Ok(Some(target))
    }

    /// Copy a conf archive back over the conf directory and verify every
    /// restored file against its archived copy.
    pub fn restore_conf(&self, tag: &BackupTag) -> DeployResult<Vec<PathBuf>> {
        let archive = self.conf_archive_path(tag);
        if !self.fs.exists(&archive) {
            return Err(DeployError::BackupNotFound { path: archive });
        }
        self.fs.create_dir_all(&self.paths.conf_path)?;
        let restored = self.fs.copy_tree(&archive, &self.paths.conf_path)?;

        for relative in &restored {
            let source = self.fs.hash(&archive.join(relative))?;
            let dest_path = self.paths.conf_path.join(relative);
            let dest = self.fs.hash(&dest_path)?;
            if source != dest {
                return Err(DeployError::RestoreMismatch { path: dest_path });
            }
        }
        Ok(restored)
    }

    /// Local conf archives of this cluster, oldest tag first
    pub fn list_backups(&self) -> DeployResult<Vec<BackupArchive>> {
        let mut archives: Vec<BackupArchive> = self
            .fs
            .list_dir(&self.paths.conf_backup_root)?
            .iter()
            .filter_map(|name| BackupArchive::from_dir_name(self.cluster_id, BackupKind::Conf, name))
            .collect();
        archives.sort_by(|a, b| a.tag.cmp(&b.tag));
        Ok(archives)
    }
}
