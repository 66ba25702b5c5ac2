use std::path::PathBuf;

use anyhow::{bail, Result};

use kvdeploy::application::{ZeroDowntimeOptions, ZeroDowntimeOutcome, ZeroDowntimeUseCase};

use super::runtime::{cluster_id, tag, Runtime};
use crate::ui::views::render_zero_downtime;

pub fn cmd_redeploy(
    rt: &Runtime,
    cluster: u32,
    installer: PathBuf,
    backup_tag: Option<String>,
) -> Result<()> {
    let id = cluster_id(cluster)?;
    if !rt.confirm(&format!(
        "Fail over every master of cluster {} to its replica?",
        id
    )) {
        bail!("aborted");
    }

    let mut options = ZeroDowntimeOptions::new(id, installer);
    if let Some(tag) = tag(backup_tag)? {
        options = options.with_tag(tag);
    }

    let outcome = rt.with_services(id, |services| {
        ZeroDowntimeUseCase::new(services).execute(&options)
    })?;

    rt.print(redeploy_json(&outcome), |ui| render_zero_downtime(ui, &outcome));
    Ok(())
}

fn redeploy_json(outcome: &ZeroDowntimeOutcome) -> serde_json::Value {
    serde_json::json!({
        "event": "result",
        "command": "zero_downtime",
        "cluster_id": outcome.cluster_id,
        "rounds": outcome.rounds,
        "promoted": outcome.promoted,
        "master_ports": outcome.ports.master().format(),
        "slave_ports": outcome.ports.slave().format(),
        "conf_backup": outcome.conf_backup,
        "data_backups": outcome.data_backups,
    })
}
