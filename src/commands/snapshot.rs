use anyhow::{bail, Result};

use kvdeploy::application::{BackupOptions, RestoreOptions, SnapshotUseCase};
use kvdeploy::domain::entities::BackupTag;

use super::runtime::{cluster_id, tag, Runtime};
use crate::ui::views::{render_backup, render_backups, render_restore, render_state};

pub fn cmd_backup(rt: &Runtime, cluster: u32, backup_tag: Option<String>, conf_only: bool) -> Result<()> {
    let id = cluster_id(cluster)?;
    let options = BackupOptions {
        tag: tag(backup_tag)?,
        include_data: !conf_only,
        ..BackupOptions::new(id)
    };

    let outcome = rt.with_services(id, |services| SnapshotUseCase::new(services).backup(&options))?;
    rt.print(serde_json::to_value(&outcome)?, |ui| render_backup(ui, &outcome));
    Ok(())
}

pub fn cmd_restore(rt: &Runtime, cluster: u32, backup_tag: String, no_sync: bool) -> Result<()> {
    let id = cluster_id(cluster)?;
    let options = RestoreOptions {
        cluster_id: id,
        tag: BackupTag::new(backup_tag)?,
        sync: !no_sync,
    };
    if !rt.confirm(&format!(
        "Replace the conf directory of cluster {} with backup {}?",
        id, options.tag
    )) {
        bail!("aborted");
    }

    let outcome = rt.with_services(id, |services| SnapshotUseCase::new(services).restore(&options))?;
    rt.print(serde_json::to_value(&outcome)?, |ui| render_restore(ui, &outcome));
    Ok(())
}

pub fn cmd_backups(rt: &Runtime, cluster: u32) -> Result<()> {
    let id = cluster_id(cluster)?;
    let archives = rt.with_services(id, |services| SnapshotUseCase::new(services).list(id))?;
    rt.print(serde_json::to_value(&archives)?, |ui| render_backups(ui, &archives));
    Ok(())
}

pub fn cmd_state(rt: &Runtime, cluster: u32) -> Result<()> {
    let id = cluster_id(cluster)?;
    let report = rt.with_services(id, |services| SnapshotUseCase::new(services).state(id))?;
    rt.print(serde_json::to_value(&report)?, |ui| render_state(ui, &report));
    Ok(())
}
