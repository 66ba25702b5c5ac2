//! Deploy Use Case
//!
//! Orchestrates a fresh deploy or a full redeploy:
//! 1. Validate the target hosts and read their deploy state
//! 2. Negotiate ports until the fleet is clear or the operator accepts
//! 3. Wipe interrupted installs, refuse hosts that already hold the cluster
//! 4. Optionally clean the running cluster, then back up conf and data
//! 5. Install on every host, write the properties, push conf
//! 6. Clear the sentinel everywhere
//!
//! Each per-host step is a barrier; a failure stops the workflow at the
//! last completed phase.

use crate::application::backup_manager::BackupManager;
use crate::application::install::{commit_host, install_host, sync_conf};
use crate::application::port_negotiator::PortNegotiator;
use crate::application::services::Services;
use crate::application::state_tracker::DeployStateTracker;
use crate::domain::entities::{
    keys, BackupKind, BackupTag, ClusterContext, ClusterPaths, PortAssignment, PropertiesDocument,
};
use crate::domain::ports::{DeployEvent, PortResolver};
use crate::domain::value_objects::{Host, Phase};
use crate::error::{DeployError, DeployResult};

use super::options::{DeployOptions, PropertiesSource};
use super::result::DeployOutcome;

const WORKFLOW: &str = "deploy";

/// Deploy use case - orchestrates the standard deploy flow
pub struct DeployUseCase<'s, 'a> {
    services: &'s Services<'a>,
    resolver: &'s dyn PortResolver,
}

impl<'s, 'a> DeployUseCase<'s, 'a> {
    pub fn new(services: &'s Services<'a>, resolver: &'s dyn PortResolver) -> Self {
        Self { services, resolver }
    }

    /// Execute the deploy use case
    pub fn execute(&self, options: &DeployOptions) -> DeployResult<DeployOutcome> {
        let s = self.services;
        let cluster_id = options.cluster_id;
        let paths = s.paths(cluster_id);
        let _lock = s.lock(cluster_id, &paths)?;
        let tag = options.tag.clone().unwrap_or_else(BackupTag::now);
        let runner = s.runner();

        // Validating
        let previous_state = DeployStateTracker::new(&paths).local_state(s.fs);
        let previous = if previous_state.is_deployed() {
            Some(s.load_context(cluster_id)?)
        } else {
            None
        };
        let (hosts, candidate) = plan_target(&options.properties, previous.as_ref())?;

        s.events.on_event(DeployEvent::Started {
            cluster_id,
            workflow: WORKFLOW.to_string(),
            hosts: hosts.clone(),
        });

        let states = runner.run(Phase::Validating, &hosts, |host| {
            let session = s.connect(Phase::Validating, host)?;
            DeployStateTracker::new(&paths)
                .state(session.as_ref())
                .map_err(|e| DeployError::remote(Phase::Validating, host, e))
        })?;
        for (host, state) in hosts.iter().zip(&states) {
            s.events.on_event(DeployEvent::StateObserved {
                host: host.clone(),
                state: *state,
            });
        }
        if !hosts.iter().any(|h| s.is_local(h)) {
            return Err(DeployError::Validation(
                "none of the target hosts is the local machine".to_string(),
            ));
        }

        // Negotiating
        let negotiated = PortNegotiator::new(s).negotiate(&hosts, candidate, self.resolver)?;
        let ports = negotiated.ports;

        // CollisionCheck: interrupted installs are discarded first
        let previous_hosts: Vec<Host> = previous
            .as_ref()
            .map(|ctx| ctx.master_hosts.clone())
            .unwrap_or_default();
        let checks = runner.run(Phase::CollisionCheck, &hosts, |host| {
            let index = hosts.iter().position(|h| h == host).unwrap_or_default();
            let pending = states.get(index).is_some_and(|state| state.is_pending());
            self.discard_and_check(&paths, host, pending, previous_hosts.contains(host))
        })?;
        let mut discarded = Vec::new();
        let mut collisions = Vec::new();
        for (host, (was_pending, collided)) in hosts.iter().zip(checks) {
            if was_pending {
                s.events.on_event(DeployEvent::PendingDiscarded { host: host.clone() });
                discarded.push(host.clone());
            }
            if collided {
                collisions.push(host.clone());
            }
        }
        if !collisions.is_empty() {
            return Err(DeployError::ClusterCollision {
                cluster_id,
                hosts: collisions,
            });
        }

        // Cleaning
        if let (Some(ctx), true) = (&previous, options.clean) {
            self.clean(ctx)?;
        }

        // BackingUp
        let backups = BackupManager::new(s.fs, &paths, cluster_id);
        let mut conf_backup = None;
        let mut data_backups = Vec::new();
        if previous.is_some() {
            s.cancel.check(Phase::BackingUp)?;
            let archive = backups.backup_conf(&tag)?;
            s.events.on_event(DeployEvent::BackupCreated {
                kind: BackupKind::Conf,
                host: None,
                path: archive.clone(),
            });
            conf_backup = Some(archive);

            let saved = runner.run(Phase::BackingUp, &previous_hosts, |host| {
                let session = s.connect(Phase::BackingUp, host)?;
                backups.backup_cluster(session.as_ref(), &tag, Phase::BackingUp)
            })?;
            for (host, path) in previous_hosts.iter().zip(saved) {
                if let Some(path) = path {
                    s.events.on_event(DeployEvent::BackupCreated {
                        kind: BackupKind::Data,
                        host: Some(host.clone()),
                        path: path.clone(),
                    });
                    data_backups.push((host.clone(), path));
                }
            }
        }

        // Installing
        runner.run(Phase::Installing, &hosts, |host| {
            install_host(s, &paths, &options.installer, host, Phase::Installing)
        })?;

        // WritingProperties
        runner.enter(Phase::WritingProperties)?;
        let doc = self.effective_properties(&options.properties, &paths, &backups, &tag, &ports)?;
        s.save_properties(&paths.properties_path, &doc)?;
        runner.leave(Phase::WritingProperties);

        // ConfSyncing
        let remote_hosts = s.remote_hosts(&hosts);
        runner.run(Phase::ConfSyncing, &remote_hosts, |host| {
            sync_conf(s, &paths, host, Phase::ConfSyncing)
        })?;

        // Completing
        runner.run(Phase::Completing, &hosts, |host| {
            commit_host(s, &paths, host, Phase::Completing)
        })?;

        s.events.on_event(DeployEvent::Completed {
            cluster_id,
            workflow: WORKFLOW.to_string(),
        });

        Ok(DeployOutcome {
            cluster_id,
            previous_state,
            hosts,
            ports,
            accepted_conflicts: negotiated.accepted,
            discarded,
            conf_backup,
            data_backups,
        })
    }

    /// Wipe an interrupted install, then report whether a host new to the
    /// cluster already carries its directory. Returns `(wiped, collided)`.
    fn discard_and_check(
        &self,
        paths: &ClusterPaths,
        host: &Host,
        pending: bool,
        known: bool,
    ) -> DeployResult<(bool, bool)> {
        let phase = Phase::CollisionCheck;
        let session = self.services.connect(phase, host)?;
        let remote = |e| DeployError::remote(phase, host, e);
        if pending {
            DeployStateTracker::new(paths)
                .discard_pending(session.as_ref())
                .map_err(remote)?;
        }
        let collided = !known && session.exists(&paths.cluster_path).map_err(remote)?;
        Ok((pending, collided))
    }

    /// Stop every node, drop runtime logs and reset node state
    fn clean(&self, ctx: &ClusterContext) -> DeployResult<()> {
        let s = self.services;
        let phase = Phase::Cleaning;
        s.runner().run(phase, &ctx.all_hosts(), |host| {
            let ports = ctx.ports_on(host);
            let node_err = |e| DeployError::node(phase, host, e);
            s.nodes.stop(host, &ports).map_err(node_err)?;
            let session = s.connect(phase, host)?;
            session
                .remove_all(&ctx.paths.log_path)
                .map_err(|e| DeployError::remote(phase, host, e))?;
            s.nodes.reset(host, &ports).map_err(node_err)
        })?;
        Ok(())
    }

    fn effective_properties(
        &self,
        source: &PropertiesSource,
        paths: &ClusterPaths,
        backups: &BackupManager<'_>,
        tag: &BackupTag,
        ports: &PortAssignment,
    ) -> DeployResult<PropertiesDocument> {
        let s = self.services;
        let mut doc = match source {
            PropertiesSource::New(topology) => {
                let mut doc = s.require_properties(&paths.properties_path)?;
                topology.write_to(&mut doc)?;
                doc
            }
            PropertiesSource::Restore => {
                // The new package's template keeps any keys it introduces
                let mut template = s.require_properties(&paths.properties_path)?;
                let files = backups.restore_conf(tag)?;
                s.events.on_event(DeployEvent::ConfRestored {
                    path: backups.conf_archive_path(tag),
                    files: files.len(),
                });
                let archived = s.require_properties(&paths.properties_path)?;
                template.overlay(&archived)?;
                template
            }
            PropertiesSource::Edited(doc) => doc.clone(),
        };
        ports.write_to(&mut doc)?;
        Ok(doc)
    }
}

/// Target hosts and candidate ports for this run.
///
/// A new topology stands on its own. Restoring reuses the deployed
/// cluster's masters and ports; an edited document supplies its own.
pub(super) fn plan_target(
    source: &PropertiesSource,
    previous: Option<&ClusterContext>,
) -> DeployResult<(Vec<Host>, PortAssignment)> {
    match (source, previous) {
        (PropertiesSource::New(topology), _) => {
            Ok((topology.hosts.clone(), topology.ports.clone()))
        }
        (PropertiesSource::Restore, Some(ctx)) => {
            Ok((ctx.master_hosts.clone(), ctx.ports.clone()))
        }
        (PropertiesSource::Edited(doc), Some(_)) => {
            let hosts = doc.get_hosts(keys::MASTER_HOSTS);
            if hosts.is_empty() {
                return Err(DeployError::Validation(format!(
                    "edited properties have no '{}'",
                    keys::MASTER_HOSTS
                )));
            }
            Ok((hosts, PortAssignment::from_properties(doc)?))
        }
        (_, None) => Err(DeployError::Validation(
            "cluster is not deployed; a new topology is required".to_string(),
        )),
    }
}
