//! kvdeploy CLI - deploy and zero-downtime redeploy for key-value clusters
//!
//! Usage: kvdeploy <COMMAND>
//!
//! Commands:
//!   deploy    Install a package on every host and write the cluster properties
//!   redeploy  Upgrade a running cluster without downtime
//!   backup    Archive the conf directory and every host's cluster directory
//!   restore   Restore the conf directory from an archive
//!   backups   List archives
//!   state     Show the deploy state of every host

use anyhow::Result;
use clap::Parser;

use kvdeploy::application::CancelToken;
use kvdeploy::config::Config;

mod cli;
mod commands;
mod ui;

use cli::{Cli, Commands};
use commands::deploy::{cmd_deploy, DeployArgs, NewClusterArgs};
use commands::redeploy::cmd_redeploy;
use commands::runtime::{print_config_warnings, Runtime};
use commands::snapshot::{cmd_backup, cmd_backups, cmd_restore, cmd_state};
use ui::context::UiContext;

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli) {
        if json {
            let event = serde_json::json!({
                "event": "error",
                "message": format!("{:#}", err),
            });
            println!("{}", event);
        } else {
            eprintln!("Error: {:#}", err);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let (config, warnings) = Config::discover(cli.config.as_deref())?;
    let ui = UiContext::new(cli.json, cli.verbose, &config);
    print_config_warnings(&warnings, &ui);

    // Interrupts are honoured at the next phase boundary
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    let rt = Runtime::new(config, ui, cli.yes, cancel);

    match cli.command {
        Commands::Deploy {
            cluster_id,
            installer,
            hosts,
            master_ports,
            slave_ports,
            replicas,
            ssd_count,
            db_path_prefix,
            properties,
            clean,
            force,
            tag,
        } => {
            let new_cluster = hosts.map(|hosts| NewClusterArgs {
                hosts,
                master_ports,
                slave_ports,
                replicas,
                ssd_count,
                db_path_prefix,
            });
            cmd_deploy(
                &rt,
                DeployArgs {
                    cluster_id,
                    installer,
                    new_cluster,
                    properties,
                    clean,
                    force,
                    tag,
                },
            )
        }
        Commands::Redeploy {
            cluster_id,
            installer,
            tag,
        } => cmd_redeploy(&rt, cluster_id, installer, tag),
        Commands::Backup {
            cluster_id,
            tag,
            conf_only,
        } => cmd_backup(&rt, cluster_id, tag, conf_only),
        Commands::Restore {
            cluster_id,
            tag,
            no_sync,
        } => cmd_restore(&rt, cluster_id, tag, no_sync),
        Commands::Backups { cluster_id } => cmd_backups(&rt, cluster_id),
        Commands::State { cluster_id } => cmd_state(&rt, cluster_id),
    }
}
