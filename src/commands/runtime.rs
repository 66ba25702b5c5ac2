//! Wiring of the concrete collaborators behind `Services`

use anyhow::Result;

use kvdeploy::application::{CancelToken, DeploySettings, Services};
use kvdeploy::config::{Config, ConfigWarning, TransferTool};
use kvdeploy::domain::entities::BackupTag;
use kvdeploy::domain::ports::DeployEventSink;
use kvdeploy::domain::value_objects::ClusterId;
use kvdeploy::infrastructure::remote::{RsyncTransfer, ScpTransfer};
use kvdeploy::infrastructure::{
    CliNodeControl, ConsoleEventSink, FsClusterLocker, JsonEventSink, LocalFs, SshExecutor,
    SystemHostResolver,
};
use kvdeploy::DeployResult;

use crate::ui::context::UiContext;

pub struct Runtime {
    pub config: Config,
    pub ui: UiContext,
    pub yes: bool,
    settings: DeploySettings,
    executor: SshExecutor,
    fs: LocalFs,
    hosts: SystemHostResolver,
    locker: FsClusterLocker,
    events: Box<dyn DeployEventSink>,
    cancel: CancelToken,
}

impl Runtime {
    pub fn new(config: Config, ui: UiContext, yes: bool, cancel: CancelToken) -> Self {
        let settings = config.deploy_settings(&current_user(), &current_hostname());
        let options = config.remote.ssh_options();
        let executor = match config.remote.transfer {
            TransferTool::Auto => SshExecutor::new(options),
            TransferTool::Rsync => SshExecutor::with_transfer(options, Box::new(RsyncTransfer)),
            TransferTool::Scp => SshExecutor::with_transfer(options, Box::new(ScpTransfer)),
        };
        let events: Box<dyn DeployEventSink> = if ui.json {
            Box::new(JsonEventSink::stdout())
        } else {
            Box::new(ConsoleEventSink::stderr(ui.console_style(), ui.verbose))
        };

        Self {
            config,
            ui,
            yes,
            settings,
            executor,
            fs: LocalFs::new(),
            hosts: SystemHostResolver::detect(),
            locker: FsClusterLocker::new(),
            events,
            cancel,
        }
    }

    /// Run `f` against services whose node control targets `cluster_id`
    pub fn with_services<T>(
        &self,
        cluster_id: ClusterId,
        f: impl FnOnce(&Services<'_>) -> DeployResult<T>,
    ) -> DeployResult<T> {
        let nodes = CliNodeControl::new(
            &self.executor,
            self.config.node.commands(),
            self.settings.paths(cluster_id),
        );
        let services = Services {
            executor: &self.executor,
            nodes: &nodes,
            fs: &self.fs,
            host_resolver: &self.hosts,
            locker: &self.locker,
            events: self.events.as_ref(),
            settings: &self.settings,
            cancel: self.cancel.clone(),
        };
        f(&services)
    }

    /// Ask before a disruptive step; `--yes` and non-interactive runs skip it
    pub fn confirm(&self, prompt: &str) -> bool {
        if self.yes || !self.ui.can_prompt() {
            return true;
        }
        kvdeploy::infrastructure::conflict::confirm(prompt, false)
    }

    /// Print a result: one JSON document in `--json` mode, text otherwise
    pub fn print(&self, json: serde_json::Value, text: impl FnOnce(&UiContext) -> String) {
        if self.ui.json {
            println!("{}", json);
        } else {
            print!("{}", text(&self.ui));
        }
    }
}

pub fn cluster_id(id: u32) -> Result<ClusterId> {
    Ok(ClusterId::new(id)?)
}

pub fn tag(tag: Option<String>) -> Result<Option<BackupTag>> {
    Ok(tag.map(BackupTag::new).transpose()?)
}

pub fn print_config_warnings(warnings: &[ConfigWarning], ui: &UiContext) {
    if ui.json {
        for warning in warnings {
            let event = serde_json::json!({
                "event": "config_warning",
                "key": warning.key,
                "file": warning.file.display().to_string(),
                "line": warning.line,
                "suggestion": warning.suggestion,
            });
            println!("{}", event);
        }
        return;
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}

fn current_user() -> String {
    ["USER", "LOGNAME"]
        .iter()
        .find_map(|k| std::env::var(k).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn current_hostname() -> String {
    std::process::Command::new("hostname")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
