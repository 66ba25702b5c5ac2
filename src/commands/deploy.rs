use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use kvdeploy::application::{DeployOptions, DeployOutcome, DeployUseCase, PropertiesSource};
use kvdeploy::domain::entities::{PortAssignment, PropertiesDocument, Topology};
use kvdeploy::domain::ports::{AcceptConflicts, PortResolver, RejectConflicts};
use kvdeploy::domain::value_objects::{Host, PortSet};
use kvdeploy::infrastructure::InteractivePortResolver;

use super::runtime::{cluster_id, tag, Runtime};
use crate::ui::views::render_deploy;

/// Layout of a new cluster as given on the command line
#[derive(Debug, Default)]
pub struct NewClusterArgs {
    pub hosts: Vec<String>,
    pub master_ports: Option<String>,
    pub slave_ports: Option<String>,
    pub replicas: Option<u32>,
    pub ssd_count: u32,
    pub db_path_prefix: String,
}

pub struct DeployArgs {
    pub cluster_id: u32,
    pub installer: PathBuf,
    pub new_cluster: Option<NewClusterArgs>,
    pub properties: Option<PathBuf>,
    pub clean: bool,
    pub force: bool,
    pub tag: Option<String>,
}

pub fn cmd_deploy(rt: &Runtime, args: DeployArgs) -> Result<()> {
    let id = cluster_id(args.cluster_id)?;
    let source = properties_source(args.new_cluster, args.properties.as_deref())?;

    if args.clean
        && !rt.confirm(&format!(
            "Stop every node of cluster {} and reset its state?",
            id
        ))
    {
        bail!("aborted");
    }

    let mut options = DeployOptions::new(id, args.installer, source).with_clean(args.clean);
    if let Some(tag) = tag(args.tag)? {
        options = options.with_tag(tag);
    }

    let resolver = resolver(rt, args.force);
    let outcome = rt.with_services(id, |services| {
        DeployUseCase::new(services, resolver.as_ref()).execute(&options)
    })?;

    rt.print(deploy_json(&outcome), |ui| render_deploy(ui, &outcome));
    Ok(())
}

fn resolver(rt: &Runtime, force: bool) -> Box<dyn PortResolver> {
    if force {
        Box::new(AcceptConflicts)
    } else if rt.ui.can_prompt() {
        Box::new(InteractivePortResolver::new())
    } else {
        Box::new(RejectConflicts)
    }
}

fn properties_source(
    new_cluster: Option<NewClusterArgs>,
    edited: Option<&Path>,
) -> Result<PropertiesSource> {
    if let Some(path) = edited {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(PropertiesSource::Edited(PropertiesDocument::parse_at(
            &text, path,
        )?));
    }
    match new_cluster {
        Some(args) => Ok(PropertiesSource::New(topology(args)?)),
        None => Ok(PropertiesSource::Restore),
    }
}

fn topology(args: NewClusterArgs) -> Result<Topology> {
    let Some(master) = args.master_ports.as_deref() else {
        bail!("--master-ports is required for a new cluster");
    };
    let master = PortSet::parse(master)?;
    let slave = match args.slave_ports.as_deref() {
        Some(ports) if !ports.trim().is_empty() => PortSet::parse(ports)?,
        _ => PortSet::new(),
    };
    let replicas = args
        .replicas
        .unwrap_or_else(|| (slave.len() / master.len().max(1)) as u32);
    let ports = PortAssignment::new(master, slave, replicas)?;
    let hosts = args.hosts.iter().map(|h| Host::new(h.trim())).collect();
    Ok(Topology::new(
        hosts,
        ports,
        args.ssd_count,
        args.db_path_prefix,
    )?)
}

fn deploy_json(outcome: &DeployOutcome) -> serde_json::Value {
    serde_json::json!({
        "event": "result",
        "command": if outcome.is_redeploy() { "redeploy" } else { "deploy" },
        "cluster_id": outcome.cluster_id,
        "previous_state": outcome.previous_state,
        "hosts": outcome.hosts,
        "master_ports": outcome.ports.master().format(),
        "slave_ports": outcome.ports.slave().format(),
        "replicas": outcome.ports.replicas(),
        "accepted_conflicts": outcome.accepted_conflicts,
        "discarded": outcome.discarded,
        "conf_backup": outcome.conf_backup,
        "data_backups": outcome.data_backups,
    })
}
