//! Result rendering for the human-readable output mode
//!
//! Progress is streamed by the event sinks; these views only render the
//! summary printed once a command returns.

use crossterm::style::Stylize;

use kvdeploy::application::{
    BackupOutcome, DeployOutcome, RestoreOutcome, StateReport, ZeroDowntimeOutcome,
};
use kvdeploy::domain::entities::{BackupArchive, BackupKind};
use kvdeploy::domain::value_objects::DeployState;

use crate::ui::context::UiContext;

fn heading(ui: &UiContext, text: &str) -> String {
    if ui.color {
        format!("{}\n", text.bold())
    } else {
        format!("{}\n", text)
    }
}

fn state_label(ui: &UiContext, state: DeployState) -> String {
    let label = state.to_string();
    if !ui.color {
        return label;
    }
    match state {
        DeployState::Deployed => label.green().to_string(),
        DeployState::Pending => label.yellow().to_string(),
        DeployState::Absent => label.dark_grey().to_string(),
    }
}

fn row(out: &mut String, key: &str, value: impl std::fmt::Display) {
    out.push_str(&format!("  {:<14} {}\n", key, value));
}

pub fn render_deploy(ui: &UiContext, outcome: &DeployOutcome) -> String {
    let action = if outcome.is_redeploy() { "Redeployed" } else { "Deployed" };
    let mut out = heading(ui, &format!("{} cluster {}", action, outcome.cluster_id));
    let hosts: Vec<&str> = outcome.hosts.iter().map(|h| h.as_str()).collect();
    row(&mut out, "hosts", hosts.join(", "));
    row(&mut out, "master ports", outcome.ports.master());
    if outcome.ports.slaves_enabled() {
        row(&mut out, "slave ports", outcome.ports.slave());
    }
    if !outcome.accepted_conflicts.is_empty() {
        let taken: Vec<String> = outcome
            .accepted_conflicts
            .iter()
            .map(|c| format!("{}:{}", c.host, c.port))
            .collect();
        row(&mut out, "ports in use", taken.join(", "));
    }
    for host in &outcome.discarded {
        row(&mut out, "wiped", host);
    }
    if let Some(path) = &outcome.conf_backup {
        row(&mut out, "conf backup", path.display());
    }
    for (host, path) in &outcome.data_backups {
        row(&mut out, "data backup", format!("{}:{}", host, path.display()));
    }
    out
}

pub fn render_zero_downtime(ui: &UiContext, outcome: &ZeroDowntimeOutcome) -> String {
    let mut out = heading(
        ui,
        &format!("Upgraded cluster {} without downtime", outcome.cluster_id),
    );
    row(&mut out, "failover", format!("{} round(s)", outcome.rounds));
    row(&mut out, "promoted", outcome.promoted.len());
    row(&mut out, "master ports", outcome.ports.master());
    row(&mut out, "slave ports", outcome.ports.slave());
    row(&mut out, "conf backup", outcome.conf_backup.display());
    out
}

pub fn render_backup(ui: &UiContext, outcome: &BackupOutcome) -> String {
    let mut out = heading(ui, &format!("Backup {}", outcome.tag));
    row(&mut out, "conf", outcome.conf_backup.display());
    for (host, path) in &outcome.data_backups {
        row(&mut out, "data", format!("{}:{}", host, path.display()));
    }
    out
}

pub fn render_restore(ui: &UiContext, outcome: &RestoreOutcome) -> String {
    let mut out = heading(ui, &format!("Restored conf from {}", outcome.tag));
    row(&mut out, "files", outcome.files.len());
    for host in &outcome.synced {
        row(&mut out, "synced", host);
    }
    out
}

pub fn render_backups(ui: &UiContext, archives: &[BackupArchive]) -> String {
    if archives.is_empty() {
        return "No backups.\n".to_string();
    }
    let mut out = heading(ui, "Backups");
    for archive in archives {
        let kind = match archive.kind {
            BackupKind::Conf => "conf",
            BackupKind::Data => "data",
        };
        row(&mut out, kind, &archive.tag);
    }
    out
}

pub fn render_state(ui: &UiContext, report: &StateReport) -> String {
    let mut out = heading(ui, &format!("Cluster {}", report.cluster_id));
    row(&mut out, "local", state_label(ui, report.local));
    for (host, state) in &report.hosts {
        row(&mut out, host.as_str(), state_label(ui, *state));
    }
    out
}
