//! Zero-Downtime Redeploy Use Case
//!
//! Phases after validation, each a barrier:
//! 1. Snapshot conf and every slave host's cluster directory
//! 2. Install the new package on master hosts only
//! 3. Restore conf, then restart every slave on the new package
//! 4. Pick one alive replica per master as its failover target
//! 5. Widen the node-liveness timeout fleet-wide
//! 6. Fail over to the targets in bounded all-or-nothing rounds
//! 7. Restore the original timeout, whatever happened in 6
//! 8. Restart the demoted masters on the new package
//! 9. Persist the swapped port lists
//!
//! Failures before 6 leave the old masters serving. Failures in 8 or 9
//! happen after the roles moved and surface as topology drift.

use crate::application::backup_manager::BackupManager;
use crate::application::install::{commit_host, install_host, sync_conf};
use crate::application::services::Services;
use crate::application::state_tracker::DeployStateTracker;
use crate::domain::entities::{BackupKind, BackupTag, ClusterContext, ClusterPaths, PortAssignment};
use crate::domain::ports::{DeployEvent, NodeRole};
use crate::domain::value_objects::{Host, NodeAddr, Phase, PortSet};
use crate::error::{DeployError, DeployResult};

use super::failover::{FailoverLoop, TimeoutWindow};
use super::options::ZeroDowntimeOptions;
use super::result::ZeroDowntimeOutcome;

const WORKFLOW: &str = "zero-downtime";

pub struct ZeroDowntimeUseCase<'s, 'a> {
    services: &'s Services<'a>,
}

impl<'s, 'a> ZeroDowntimeUseCase<'s, 'a> {
    pub fn new(services: &'s Services<'a>) -> Self {
        Self { services }
    }

    pub fn execute(&self, options: &ZeroDowntimeOptions) -> DeployResult<ZeroDowntimeOutcome> {
        let s = self.services;
        let cluster_id = options.cluster_id;
        let paths = s.paths(cluster_id);
        let _lock = s.lock(cluster_id, &paths)?;
        let tag = options.tag.clone().unwrap_or_else(BackupTag::now);
        let runner = s.runner();

        // Validating
        if !DeployStateTracker::new(&paths).local_state(s.fs).is_deployed() {
            return Err(DeployError::Validation(format!(
                "cluster {} is not deployed",
                cluster_id
            )));
        }
        let ctx = s.load_context(cluster_id)?;
        if !ctx.slaves_enabled() {
            return Err(DeployError::Validation(format!(
                "cluster {} has no slaves to fail over to",
                cluster_id
            )));
        }
        let hosts = ctx.all_hosts();
        let masters = ctx.master_nodes();
        let slaves = ctx.slave_nodes();

        s.events.on_event(DeployEvent::Started {
            cluster_id,
            workflow: WORKFLOW.to_string(),
            hosts: hosts.clone(),
        });
        self.check_masters_alive(&ctx, &hosts)?;

        // 1. Snapshot
        let backups = BackupManager::new(s.fs, &paths, cluster_id);
        s.cancel.check(Phase::Snapshot)?;
        let conf_backup = backups.backup_conf(&tag)?;
        s.events.on_event(DeployEvent::BackupCreated {
            kind: BackupKind::Conf,
            host: None,
            path: conf_backup.clone(),
        });
        let saved = runner.run(Phase::Snapshot, &ctx.slave_hosts, |host| {
            let session = s.connect(Phase::Snapshot, host)?;
            backups.backup_cluster(session.as_ref(), &tag, Phase::Snapshot)
        })?;
        let mut data_backups = Vec::new();
        for (host, path) in ctx.slave_hosts.iter().zip(saved) {
            if let Some(path) = path {
                s.events.on_event(DeployEvent::BackupCreated {
                    kind: BackupKind::Data,
                    host: Some(host.clone()),
                    path: path.clone(),
                });
                data_backups.push((host.clone(), path));
            }
        }

        // 2. InstallMasters
        runner.run(Phase::InstallMasters, &ctx.master_hosts, |host| {
            install_host(s, &paths, &options.installer, host, Phase::InstallMasters)
        })?;

        // 3. RestartSlaves
        s.cancel.check(Phase::RestartSlaves)?;
        let restored = backups.restore_conf(&tag)?;
        s.events.on_event(DeployEvent::ConfRestored {
            path: conf_backup.clone(),
            files: restored.len(),
        });
        runner.run(Phase::RestartSlaves, &hosts, |host| {
            let phase = Phase::RestartSlaves;
            if !s.is_local(host) {
                sync_conf(s, &paths, host, phase)?;
            }
            if ctx.master_hosts.contains(host) {
                commit_host(s, &paths, host, phase)?;
            }
            if ctx.slave_hosts.contains(host) {
                restart_nodes(s, host, ctx.ports.slave(), phase)?;
            }
            Ok(())
        })?;
        s.nodes
            .wait_until_up(&slaves, s.settings.node_up_timeout)
            .map_err(|e| DeployError::node(Phase::RestartSlaves, format!("cluster {}", cluster_id), e))?;

        // 4. VerifyReplicas
        let targets = self.failover_targets(&masters)?;

        // 5-7. WidenTimeout, Failover, RestoreTimeout
        let rounds = self.fail_over(&masters, &slaves, &targets)?;

        // 8. RestartMasters
        let new_master: PortSet = targets.iter().map(|t| t.port).collect();
        let drift = |phase: Phase, err: DeployError| DeployError::TopologyDrift {
            phase,
            message: format!("{}; live masters: {}", err, join_nodes(&targets)),
        };
        self.restart_masters(&ctx, &masters)
            .map_err(|e| drift(Phase::RestartMasters, e))?;

        // 9. PersistTopology
        let ports = self
            .persist_topology(&ctx, &paths, &new_master)
            .map_err(|e| drift(Phase::PersistTopology, e))?;
        self.verify_masters(&ctx, &ports)?;

        s.events.on_event(DeployEvent::Completed {
            cluster_id,
            workflow: WORKFLOW.to_string(),
        });

        Ok(ZeroDowntimeOutcome {
            cluster_id,
            rounds,
            promoted: targets,
            ports,
            conf_backup,
            data_backups,
        })
    }

    /// Every host reachable, every master answering
    fn check_masters_alive(&self, ctx: &ClusterContext, hosts: &[Host]) -> DeployResult<()> {
        let s = self.services;
        let phase = Phase::Validating;
        let dead: Vec<NodeAddr> = s
            .runner()
            .run(phase, hosts, |host| {
                s.connect(phase, host)?;
                let mut dead = Vec::new();
                if ctx.master_hosts.contains(host) {
                    for port in ctx.ports.master().iter() {
                        let node = NodeAddr::new(host.clone(), port);
                        let alive = s
                            .nodes
                            .is_alive(&node)
                            .map_err(|e| DeployError::node(phase, &node, e))?;
                        if !alive {
                            dead.push(node);
                        }
                    }
                }
                Ok(dead)
            })?
            .into_iter()
            .flatten()
            .collect();

        if !dead.is_empty() {
            return Err(DeployError::Validation(format!(
                "disconnected master(s): {} of {} expected are down: {}",
                dead.len(),
                ctx.master_nodes().len(),
                join_nodes(&dead)
            )));
        }
        Ok(())
    }

    /// First alive replica of every master; every master must have one
    fn failover_targets(&self, masters: &[NodeAddr]) -> DeployResult<Vec<NodeAddr>> {
        let s = self.services;
        let phase = Phase::VerifyReplicas;
        let runner = s.runner();
        runner.enter(phase)?;

        let mut targets = Vec::with_capacity(masters.len());
        let mut orphaned = Vec::new();
        for master in masters {
            let alive = s
                .nodes
                .alive_slaves(master)
                .map_err(|e| DeployError::node(phase, master, e))?;
            match alive.into_iter().find(|slave| !targets.contains(slave)) {
                Some(slave) => targets.push(slave),
                None => orphaned.push(master.clone()),
            }
        }
        if !orphaned.is_empty() {
            return Err(DeployError::Validation(format!(
                "no alive slave for master(s): {}",
                join_nodes(&orphaned)
            )));
        }

        runner.leave(phase);
        Ok(targets)
    }

    /// Widen the timeout, run the failover rounds, then restore the
    /// timeout on every node no matter how the rounds went.
    fn fail_over(
        &self,
        masters: &[NodeAddr],
        slaves: &[NodeAddr],
        targets: &[NodeAddr],
    ) -> DeployResult<u32> {
        let s = self.services;
        let settings = &s.settings.failover;
        let runner = s.runner();

        runner.enter(Phase::WidenTimeout)?;
        let (first_master, first_slave) = match (masters.first(), slaves.first()) {
            (Some(m), Some(sl)) => (m, sl),
            _ => {
                return Err(DeployError::Validation(
                    "cluster has no master or slave nodes".to_string(),
                ))
            }
        };
        let window = TimeoutWindow::capture(s.nodes, &settings.timeout_key, first_master, first_slave)?;

        let all: Vec<NodeAddr> = masters.iter().chain(slaves).cloned().collect();
        let failover = window
            .widen(s.nodes, &all, &settings.widened_timeout)
            .and_then(|()| {
                s.events.on_event(DeployEvent::TimeoutWidened {
                    key: window.key.clone(),
                    master_value: window.master_value.clone(),
                    slave_value: window.slave_value.clone(),
                    widened: settings.widened_timeout.clone(),
                });
                runner.leave(Phase::WidenTimeout);
                runner.enter(Phase::Failover)?;
                let rounds = FailoverLoop::new(s.nodes, settings, s.events).run(targets)?;
                runner.leave(Phase::Failover);
                Ok(rounds)
            });

        // Not cancellable: the timeout goes back even after an interrupt
        s.events.on_event(DeployEvent::PhaseStarted {
            phase: Phase::RestoreTimeout,
            hosts: 0,
        });
        let restored = window.restore(s.nodes, masters, slaves);
        if restored.is_ok() {
            s.events.on_event(DeployEvent::TimeoutRestored {
                key: window.key.clone(),
            });
            runner.leave(Phase::RestoreTimeout);
        }

        match (failover, restored) {
            (Ok(rounds), Ok(())) => Ok(rounds),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore_err)) => {
                s.events.on_event(DeployEvent::Warning {
                    message: format!("timeout restore failed: {}", restore_err),
                });
                Err(err)
            }
        }
    }

    /// Restart the demoted masters on the new package
    fn restart_masters(&self, ctx: &ClusterContext, masters: &[NodeAddr]) -> DeployResult<()> {
        let s = self.services;
        let phase = Phase::RestartMasters;
        s.runner().run(phase, &ctx.master_hosts, |host| {
            restart_nodes(s, host, ctx.ports.master(), phase)
        })?;
        s.nodes
            .wait_until_up(masters, s.settings.node_up_timeout)
            .map_err(|e| DeployError::node(phase, format!("cluster {}", ctx.cluster_id), e))
    }

    /// Write the swapped port lists locally, then push conf to remote hosts
    fn persist_topology(
        &self,
        ctx: &ClusterContext,
        paths: &ClusterPaths,
        new_master: &PortSet,
    ) -> DeployResult<PortAssignment> {
        let s = self.services;
        let phase = Phase::PersistTopology;
        s.cancel.check(phase)?;

        let ports = ctx.ports.swapped(new_master)?;
        let mut doc = s.require_properties(&paths.properties_path)?;
        ports.write_to(&mut doc)?;
        s.save_properties(&paths.properties_path, &doc)?;
        s.events.on_event(DeployEvent::TopologyPersisted {
            master_ports: ports.master().format(),
            slave_ports: ports.slave().format(),
        });

        let remote_hosts = s.remote_hosts(&ctx.all_hosts());
        s.runner()
            .run(phase, &remote_hosts, |host| sync_conf(s, paths, host, phase))?;
        Ok(ports)
    }

    /// Every node the persisted lists call a master must hold that role
    fn verify_masters(&self, ctx: &ClusterContext, ports: &PortAssignment) -> DeployResult<()> {
        let s = self.services;
        let expected = NodeAddr::product(&ctx.master_hosts, ports.master().iter());
        let mismatched: Vec<NodeAddr> = expected
            .into_iter()
            .filter(|node| !matches!(s.nodes.role(node), Ok(NodeRole::Master)))
            .collect();
        if mismatched.is_empty() {
            return Ok(());
        }
        Err(DeployError::TopologyDrift {
            phase: Phase::PersistTopology,
            message: format!(
                "persisted as masters but not holding the role: {}",
                join_nodes(&mismatched)
            ),
        })
    }
}

/// Stop, reconfigure and start the listed node processes on one host
fn restart_nodes(services: &Services<'_>, host: &Host, ports: &PortSet, phase: Phase) -> DeployResult<()> {
    let node_err = |e| DeployError::node(phase, host, e);
    services.nodes.stop(host, ports).map_err(node_err)?;
    services.nodes.configure(host, ports).map_err(node_err)?;
    services.nodes.start(host, ports).map_err(node_err)
}

fn join_nodes(nodes: &[NodeAddr]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
