//! Deploy state tracker
//!
//! A host's state is read from its filesystem: the sentinel marker means
//! an install is in flight or was interrupted, the cluster directory means
//! a completed install, and neither means nothing is there.

use crate::domain::entities::ClusterPaths;
use crate::domain::ports::{FileSystem, RemoteResult, Session};
use crate::domain::value_objects::DeployState;

pub struct DeployStateTracker<'a> {
    paths: &'a ClusterPaths,
}

impl<'a> DeployStateTracker<'a> {
    pub fn new(paths: &'a ClusterPaths) -> Self {
        Self { paths }
    }

    pub fn state(&self, session: &dyn Session) -> RemoteResult<DeployState> {
        if session.exists(&self.paths.sentinel)? {
            return Ok(DeployState::Pending);
        }
        if session.exists(&self.paths.properties_path)? || session.exists(&self.paths.cluster_path)? {
            return Ok(DeployState::Deployed);
        }
        Ok(DeployState::Absent)
    }

    /// State on the orchestrating machine; picks the workflow branch
    pub fn local_state(&self, fs: &dyn FileSystem) -> DeployState {
        if fs.exists(&self.paths.sentinel) {
            DeployState::Pending
        } else if fs.exists(&self.paths.properties_path) || fs.exists(&self.paths.cluster_path) {
            DeployState::Deployed
        } else {
            DeployState::Absent
        }
    }

    /// Create the cluster directory and the sentinel. Must precede any transfer.
    pub fn begin_install(&self, session: &dyn Session) -> RemoteResult<()> {
        session.create_dir_all(&self.paths.cluster_path)?;
        session.touch(&self.paths.sentinel)
    }

    pub fn commit_install(&self, session: &dyn Session) -> RemoteResult<()> {
        session.remove_all(&self.paths.sentinel)
    }

    /// Wipe the leftovers of an interrupted install
    pub fn discard_pending(&self, session: &dyn Session) -> RemoteResult<()> {
        session.remove_all(&self.paths.cluster_path)
    }
}
