//! Isolated workflow environment.
//!
//! `local` is the orchestrating machine; `node-b` is a remote host whose
//! files live below the temp root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use kvdeploy::application::{CancelToken, DeploySettings, FailoverSettings, Services};
use kvdeploy::domain::entities::ClusterPaths;
use kvdeploy::domain::ports::StaticHostResolver;
use kvdeploy::domain::value_objects::{ClusterId, Host};
use kvdeploy::infrastructure::{FsClusterLocker, LocalFs};
use tempfile::TempDir;

use super::events::RecordingSink;
use super::fleet::{FakeFleet, INSTALL_COMMAND};
use super::nodes::FakeNodes;

pub const LOCAL: &str = "local";
pub const REMOTE: &str = "node-b";

pub fn cluster_id() -> ClusterId {
    ClusterId::new(3).unwrap()
}

/// Properties of a deployed two-host cluster with one replica per master
pub const DEPLOYED_PROPERTIES: &str = "\
## cluster layout
sr2_redis_master_hosts = local, node-b
sr2_redis_master_ports = 18100-18101
sr2_redis_slave_hosts = local, node-b
sr2_redis_slave_ports = 18150-18151
ssd_count = 3
#sr2_redis_data = ~/sata_ssd/ssd_
custom_tuning = keep-me
";

pub struct TestEnv {
    pub dir: TempDir,
    pub settings: DeploySettings,
    pub fleet: FakeFleet,
    pub nodes: FakeNodes,
    pub fs: LocalFs,
    pub hosts: StaticHostResolver,
    pub locker: FsClusterLocker,
    pub events: RecordingSink,
    pub cancel: CancelToken,
}

impl TestEnv {
    pub fn new(nodes: FakeNodes) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let settings = DeploySettings {
            base_directory: dir.path().join("base"),
            cli_root: dir.path().join("cli"),
            max_parallel_hosts: 0,
            install_command: INSTALL_COMMAND.to_string(),
            node_up_timeout: Duration::from_secs(1),
            owner: "tester".to_string(),
            hostname: "orchestrator".to_string(),
            failover: FailoverSettings {
                round_delay: Duration::ZERO,
                ..FailoverSettings::default()
            },
        };
        let fleet = FakeFleet::new(dir.path().join("fleet"), Host::new(LOCAL));
        Self {
            dir,
            settings,
            fleet,
            nodes,
            fs: LocalFs::new(),
            hosts: StaticHostResolver::new([Host::new(LOCAL)]),
            locker: FsClusterLocker::new(),
            events: RecordingSink::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Environment with no node processes of interest
    pub fn empty() -> Self {
        Self::new(FakeNodes::cluster(&[], "15000", "15000"))
    }

    pub fn services(&self) -> Services<'_> {
        Services {
            executor: &self.fleet,
            nodes: &self.nodes,
            fs: &self.fs,
            host_resolver: &self.hosts,
            locker: &self.locker,
            events: &self.events,
            settings: &self.settings,
            cancel: self.cancel.clone(),
        }
    }

    pub fn paths(&self) -> ClusterPaths {
        self.settings.paths(cluster_id())
    }

    /// A local installer artifact
    pub fn installer(&self, version: &str) -> PathBuf {
        let path = self.dir.path().join("artifacts").join("kv-server.bin");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, version).unwrap();
        path
    }

    /// Lay out a committed install of cluster 3 on both hosts
    pub fn seed_deployed(&self, properties: &str, version: &str) {
        let paths = self.paths();
        for host in [LOCAL, REMOTE] {
            self.fleet
                .write(host, &paths.cluster_path.join("bin").join("VERSION"), version);
            self.fleet.write(host, &paths.properties_path, properties);
        }
    }

    pub fn local_properties(&self) -> String {
        std::fs::read_to_string(self.paths().properties_path).unwrap()
    }

    pub fn version_on(&self, host: &str) -> Option<String> {
        self.fleet
            .read(host, &self.paths().cluster_path.join("bin").join("VERSION"))
    }

    pub fn sentinel_on(&self, host: &str) -> bool {
        self.fleet.exists(host, &self.paths().sentinel)
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
