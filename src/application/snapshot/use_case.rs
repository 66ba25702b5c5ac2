//! Snapshot Use Case
//!
//! Backup and restore take the cluster lock; listing and state queries
//! only read.

use crate::application::backup_manager::BackupManager;
use crate::application::install::sync_conf;
use crate::application::services::Services;
use crate::application::state_tracker::DeployStateTracker;
use crate::domain::entities::{BackupArchive, BackupKind, BackupTag};
use crate::domain::ports::DeployEvent;
use crate::domain::value_objects::{ClusterId, Phase};
use crate::error::{DeployError, DeployResult};

use super::options::{BackupOptions, RestoreOptions};
use super::result::{BackupOutcome, RestoreOutcome, StateReport};

pub struct SnapshotUseCase<'s, 'a> {
    services: &'s Services<'a>,
}

impl<'s, 'a> SnapshotUseCase<'s, 'a> {
    pub fn new(services: &'s Services<'a>) -> Self {
        Self { services }
    }

    /// Archive the conf directory and, optionally, every host's cluster directory
    pub fn backup(&self, options: &BackupOptions) -> DeployResult<BackupOutcome> {
        let s = self.services;
        let paths = s.paths(options.cluster_id);
        let _lock = s.lock(options.cluster_id, &paths)?;
        let ctx = s.load_context(options.cluster_id)?;
        let tag = options.tag.clone().unwrap_or_else(BackupTag::now);
        let backups = BackupManager::new(s.fs, &paths, options.cluster_id);

        s.cancel.check(Phase::BackingUp)?;
        let conf_backup = backups.backup_conf(&tag)?;
        s.events.on_event(DeployEvent::BackupCreated {
            kind: BackupKind::Conf,
            host: None,
            path: conf_backup.clone(),
        });

        let mut data_backups = Vec::new();
        if options.include_data {
            let hosts = ctx.all_hosts();
            let saved = s.runner().run(Phase::BackingUp, &hosts, |host| {
                let session = s.connect(Phase::BackingUp, host)?;
                backups.backup_cluster(session.as_ref(), &tag, Phase::BackingUp)
            })?;
            for (host, path) in hosts.into_iter().zip(saved) {
                if let Some(path) = path {
                    s.events.on_event(DeployEvent::BackupCreated {
                        kind: BackupKind::Data,
                        host: Some(host.clone()),
                        path: path.clone(),
                    });
                    data_backups.push((host, path));
                }
            }
        }

        Ok(BackupOutcome {
            tag,
            conf_backup,
            data_backups,
        })
    }

    /// Copy a conf archive back over the conf directory
    pub fn restore(&self, options: &RestoreOptions) -> DeployResult<RestoreOutcome> {
        let s = self.services;
        let paths = s.paths(options.cluster_id);
        let _lock = s.lock(options.cluster_id, &paths)?;
        let backups = BackupManager::new(s.fs, &paths, options.cluster_id);
        let runner = s.runner();

        runner.enter(Phase::Restoring)?;
        let files = backups.restore_conf(&options.tag)?;
        s.events.on_event(DeployEvent::ConfRestored {
            path: backups.conf_archive_path(&options.tag),
            files: files.len(),
        });
        runner.leave(Phase::Restoring);

        let mut synced = Vec::new();
        if options.sync {
            let ctx = s.load_context(options.cluster_id)?;
            synced = s.remote_hosts(&ctx.all_hosts());
            runner.run(Phase::ConfSyncing, &synced, |host| {
                sync_conf(s, &paths, host, Phase::ConfSyncing)
            })?;
        }

        Ok(RestoreOutcome {
            tag: options.tag.clone(),
            files,
            synced,
        })
    }

    pub fn list(&self, cluster_id: ClusterId) -> DeployResult<Vec<BackupArchive>> {
        let paths = self.services.paths(cluster_id);
        BackupManager::new(self.services.fs, &paths, cluster_id).list_backups()
    }

    /// Local state, plus every host's state once the cluster is deployed
    pub fn state(&self, cluster_id: ClusterId) -> DeployResult<StateReport> {
        let s = self.services;
        let paths = s.paths(cluster_id);
        let tracker = DeployStateTracker::new(&paths);
        let local = tracker.local_state(s.fs);

        let mut hosts = Vec::new();
        if local.is_deployed() {
            let ctx = s.load_context(cluster_id)?;
            let all = ctx.all_hosts();
            let states = s.runner().run(Phase::Validating, &all, |host| {
                let session = s.connect(Phase::Validating, host)?;
                tracker
                    .state(session.as_ref())
                    .map_err(|e| DeployError::remote(Phase::Validating, host, e))
            })?;
            hosts = all.into_iter().zip(states).collect();
        }

        Ok(StateReport {
            cluster_id,
            local,
            hosts,
        })
    }
}
