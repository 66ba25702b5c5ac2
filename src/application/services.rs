//! Collaborators shared by every workflow
//!
//! A `Services` value bundles the ports a workflow drives plus the
//! resolved settings. It is built once by the front end (or by a test)
//! and borrowed by each use case.

use std::path::Path;

use crate::application::cancel::CancelToken;
use crate::application::phase_runner::PhaseRunner;
use crate::application::settings::DeploySettings;
use crate::domain::entities::{ClusterContext, ClusterPaths, LockRecord, PropertiesDocument};
use crate::domain::ports::{
    ClusterLockGuard, ClusterLocker, DeployEventSink, FileSystem, FsError, HostResolver,
    NodeControl, RemoteExecutor, Session,
};
use crate::domain::value_objects::{ClusterId, Host, Phase};
use crate::error::{DeployError, DeployResult};

pub struct Services<'a> {
    pub executor: &'a dyn RemoteExecutor,
    pub nodes: &'a dyn NodeControl,
    pub fs: &'a dyn FileSystem,
    pub host_resolver: &'a dyn HostResolver,
    pub locker: &'a dyn ClusterLocker,
    pub events: &'a dyn DeployEventSink,
    pub settings: &'a DeploySettings,
    pub cancel: CancelToken,
}

impl<'a> Services<'a> {
    pub fn runner(&self) -> PhaseRunner<'_> {
        PhaseRunner::new(self.events, &self.cancel, self.settings.max_parallel_hosts)
    }

    pub fn paths(&self, cluster_id: ClusterId) -> ClusterPaths {
        self.settings.paths(cluster_id)
    }

    /// Open a session, attributing failures to `phase`
    pub fn connect(&self, phase: Phase, host: &Host) -> DeployResult<Box<dyn Session>> {
        self.executor
            .connect(host)
            .map_err(|e| DeployError::remote(phase, host, e))
    }

    /// Take the per-cluster lock for the lifetime of the guard
    pub fn lock(&self, cluster_id: ClusterId, paths: &ClusterPaths) -> DeployResult<ClusterLockGuard> {
        let record = LockRecord::new(
            cluster_id,
            self.settings.owner.clone(),
            self.settings.hostname.clone(),
        );
        self.locker.acquire(&paths.lock_path, record)
    }

    pub fn load_properties(&self, path: &Path) -> DeployResult<Option<PropertiesDocument>> {
        match self.fs.read(path) {
            Ok(text) => PropertiesDocument::parse_at(&text, path).map(Some),
            Err(FsError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Load a properties file that must exist
    pub fn require_properties(&self, path: &Path) -> DeployResult<PropertiesDocument> {
        self.load_properties(path)?.ok_or_else(|| {
            DeployError::Validation(format!("properties file {} does not exist", path.display()))
        })
    }

    pub fn save_properties(&self, path: &Path, doc: &PropertiesDocument) -> DeployResult<()> {
        self.fs.write(path, &doc.render())?;
        Ok(())
    }

    /// Resolve the live topology of a deployed cluster from its local properties
    pub fn load_context(&self, cluster_id: ClusterId) -> DeployResult<ClusterContext> {
        let paths = self.paths(cluster_id);
        let doc = self.require_properties(&paths.properties_path)?;
        ClusterContext::from_properties(cluster_id, paths, doc)
    }

    pub fn is_local(&self, host: &Host) -> bool {
        self.host_resolver.is_local(host)
    }

    /// Hosts that need files pushed to them
    pub fn remote_hosts(&self, hosts: &[Host]) -> Vec<Host> {
        hosts.iter().filter(|h| !self.is_local(h)).cloned().collect()
    }
}
