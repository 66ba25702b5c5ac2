//! Per-host install and conf propagation steps shared by both deploy
//! workflows.

use std::path::Path;

use crate::application::services::Services;
use crate::application::state_tracker::DeployStateTracker;
use crate::domain::entities::ClusterPaths;
use crate::domain::ports::RemoteError;
use crate::domain::value_objects::{Host, Phase};
use crate::error::{DeployError, DeployResult};

/// Mark the host pending, ship the installer and run it.
///
/// The sentinel is left in place; committing is a separate step once
/// the whole workflow has succeeded.
pub fn install_host(
    services: &Services<'_>,
    paths: &ClusterPaths,
    installer: &Path,
    host: &Host,
    phase: Phase,
) -> DeployResult<()> {
    let session = services.connect(phase, host)?;
    let remote = |e| DeployError::remote(phase, host, e);
    let tracker = DeployStateTracker::new(paths);

    tracker.begin_install(session.as_ref()).map_err(remote)?;

    let file_name = installer.file_name().ok_or_else(|| {
        DeployError::Validation(format!("installer path {} has no file name", installer.display()))
    })?;
    let remote_installer = paths.cluster_path.join(file_name);
    session
        .copy_tree(installer, &remote_installer)
        .map_err(remote)?;

    let command = services
        .settings
        .render_install_command(&remote_installer, paths);
    session.run(&command).map_err(|e| match e {
        RemoteError::CommandFailed { .. } => DeployError::Install {
            host: host.clone(),
            message: e.to_string(),
        },
        other => DeployError::remote(phase, host, other),
    })?;

    session.remove_all(&remote_installer).map_err(remote)
}

/// Push the local conf directory to `host`
pub fn sync_conf(
    services: &Services<'_>,
    paths: &ClusterPaths,
    host: &Host,
    phase: Phase,
) -> DeployResult<()> {
    let session = services.connect(phase, host)?;
    session
        .copy_tree(&paths.conf_path, &paths.conf_path)
        .map_err(|e| DeployError::remote(phase, host, e))
}

pub fn commit_host(
    services: &Services<'_>,
    paths: &ClusterPaths,
    host: &Host,
    phase: Phase,
) -> DeployResult<()> {
    let session = services.connect(phase, host)?;
    DeployStateTracker::new(paths)
        .commit_install(session.as_ref())
        .map_err(|e| DeployError::remote(phase, host, e))
}
