use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// kvdeploy - deploy and zero-downtime redeploy for key-value clusters
#[derive(Parser, Debug)]
#[command(name = "kvdeploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit NDJSON events instead of progress lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (overrides $KVDEPLOY_CONFIG and ~/.kvdeploy/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Answer yes to confirmations
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a package on every host and write the cluster properties
    ///
    /// With --hosts a new cluster is laid out. On a deployed cluster the
    /// conf backup taken during the run is restored, unless --properties
    /// supplies an edited document.
    Deploy {
        /// Cluster id
        cluster_id: u32,

        /// Installer artifact shipped to every host
        #[arg(short, long)]
        installer: PathBuf,

        /// Hosts of a new cluster (comma-separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "properties")]
        hosts: Option<Vec<String>>,

        /// Master ports of a new cluster, e.g. 18100-18104
        #[arg(long, requires = "hosts")]
        master_ports: Option<String>,

        /// Slave ports of a new cluster, e.g. 18150-18159
        #[arg(long, requires = "hosts")]
        slave_ports: Option<String>,

        /// Replicas per master; derived from the port lists when omitted
        #[arg(long, requires = "hosts")]
        replicas: Option<u32>,

        /// SSDs per host
        #[arg(long, default_value_t = 1)]
        ssd_count: u32,

        /// Data path prefix written (commented out) into the properties
        #[arg(long, default_value = "~/sata_ssd/ssd_")]
        db_path_prefix: String,

        /// Operator-edited properties file to deploy over a running cluster
        #[arg(long)]
        properties: Option<PathBuf>,

        /// Stop nodes, drop logs and reset node state first
        #[arg(long)]
        clean: bool,

        /// Continue even if ports are already in use
        #[arg(short, long)]
        force: bool,

        /// Backup tag (default: UTC timestamp)
        #[arg(long)]
        tag: Option<String>,
    },

    /// Upgrade a running cluster without downtime
    ///
    /// Installs on the master hosts, restarts the replicas on the new
    /// package, fails over to them and restarts the old masters as replicas.
    Redeploy {
        /// Cluster id
        cluster_id: u32,

        /// Installer artifact shipped to the master hosts
        #[arg(short, long)]
        installer: PathBuf,

        /// Backup tag (default: UTC timestamp)
        #[arg(long)]
        tag: Option<String>,
    },

    /// Archive the conf directory and every host's cluster directory
    Backup {
        /// Cluster id
        cluster_id: u32,

        /// Backup tag (default: UTC timestamp)
        #[arg(long)]
        tag: Option<String>,

        /// Only archive the conf directory
        #[arg(long)]
        conf_only: bool,
    },

    /// Restore the conf directory from an archive
    Restore {
        /// Cluster id
        cluster_id: u32,

        /// Archive tag (see `kvdeploy backups`)
        tag: String,

        /// Leave remote hosts untouched
        #[arg(long)]
        no_sync: bool,
    },

    /// List conf and data archives
    Backups {
        /// Cluster id
        cluster_id: u32,
    },

    /// Show the deploy state of every host
    State {
        /// Cluster id
        cluster_id: u32,
    },
}
