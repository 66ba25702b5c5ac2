//! Remote hosts emulated on the local file system.
//!
//! The local host sees paths as they are; every other host sees them
//! below `<root>/<host>/`. The install command is interpreted: it lays
//! down a package marker and a fresh properties template, overwriting
//! the conf directory like a full install does.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use kvdeploy::domain::ports::{CommandOutput, RemoteError, RemoteExecutor, RemoteResult, Session};
use kvdeploy::domain::value_objects::Host;

/// Install command template understood by the fake fleet
pub const INSTALL_COMMAND: &str = "install {installer} {cluster_path}";

/// What a fresh install writes to `conf/redis.properties`
pub const PROPERTIES_TEMPLATE: &str = "\
## cluster layout
#sr2_redis_master_hosts = 127.0.0.1
#sr2_redis_master_ports = 18100
#sr2_redis_slave_hosts = 127.0.0.1
#sr2_redis_slave_ports = 18150
#ssd_count = 3
#sr2_redis_data = ~/sata_ssd/ssd_
#sr2_redis_db_path = ~/sata_ssd/ssd_
#sr2_flash_db_path = ~/sata_ssd/ssd_
";

#[derive(Default)]
struct FleetState {
    commands: Vec<(Host, String)>,
    listening: HashMap<Host, BTreeSet<u16>>,
    unreachable: BTreeSet<Host>,
    failing_install: BTreeSet<Host>,
}

#[derive(Clone)]
pub struct FakeFleet {
    root: PathBuf,
    local: Host,
    state: Arc<Mutex<FleetState>>,
}

impl FakeFleet {
    pub fn new(root: impl Into<PathBuf>, local: Host) -> Self {
        Self {
            root: root.into(),
            local,
            state: Arc::default(),
        }
    }

    /// Where `path` on `host` lives on this machine
    pub fn map(&self, host: &Host, path: &Path) -> PathBuf {
        if *host == self.local {
            return path.to_path_buf();
        }
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.root.join(host.as_str()).join(relative)
    }

    pub fn listen(&self, host: &str, ports: &[u16]) {
        self.state
            .lock()
            .unwrap()
            .listening
            .insert(Host::new(host), ports.iter().copied().collect());
    }

    pub fn set_unreachable(&self, host: &str) {
        self.state.lock().unwrap().unreachable.insert(Host::new(host));
    }

    pub fn fail_install(&self, host: &str, failing: bool) {
        let mut state = self.state.lock().unwrap();
        if failing {
            state.failing_install.insert(Host::new(host));
        } else {
            state.failing_install.remove(&Host::new(host));
        }
    }

    pub fn commands(&self) -> Vec<(Host, String)> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.commands().iter().any(|(_, c)| c.contains(needle))
    }

    /// Read a file as `host` sees it
    pub fn read(&self, host: &str, path: &Path) -> Option<String> {
        fs::read_to_string(self.map(&Host::new(host), path)).ok()
    }

    pub fn exists(&self, host: &str, path: &Path) -> bool {
        self.map(&Host::new(host), path).exists()
    }

    /// Write a file as `host` sees it
    pub fn write(&self, host: &str, path: &Path, content: &str) {
        let target = self.map(&Host::new(host), path);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, content).unwrap();
    }
}

impl RemoteExecutor for FakeFleet {
    fn connect(&self, host: &Host) -> RemoteResult<Box<dyn Session>> {
        if self.state.lock().unwrap().unreachable.contains(host) {
            return Err(RemoteError::Connection(format!("{}: no route to host", host)));
        }
        Ok(Box::new(FakeSession {
            host: host.clone(),
            fleet: self.clone(),
        }))
    }
}

pub struct FakeSession {
    host: Host,
    fleet: FakeFleet,
}

impl FakeSession {
    fn map(&self, path: &Path) -> PathBuf {
        self.fleet.map(&self.host, path)
    }

    fn install(&self, installer: &Path, cluster_path: &Path) -> std::io::Result<()> {
        let package = fs::read_to_string(self.map(installer))?;
        let cluster = self.map(cluster_path);
        fs::create_dir_all(cluster.join("bin"))?;
        fs::write(cluster.join("bin").join("VERSION"), package)?;
        fs::create_dir_all(cluster.join("conf"))?;
        fs::write(cluster.join("conf").join("redis.properties"), PROPERTIES_TEMPLATE)
    }
}

fn ok() -> CommandOutput {
    CommandOutput::default()
}

impl Session for FakeSession {
    fn host(&self) -> &Host {
        &self.host
    }

    fn run_tolerant(&self, command: &str) -> RemoteResult<CommandOutput> {
        let failing = {
            let mut state = self.fleet.state.lock().unwrap();
            state.commands.push((self.host.clone(), command.to_string()));
            state.failing_install.contains(&self.host)
        };

        let words: Vec<&str> = command.split_whitespace().collect();
        match words.as_slice() {
            ["install", installer, cluster_path] => {
                if failing {
                    return Ok(CommandOutput {
                        stdout: String::new(),
                        stderr: "installer crashed".to_string(),
                        exit_code: 1,
                    });
                }
                self.install(Path::new(installer), Path::new(cluster_path))?;
                Ok(ok())
            }
            _ => Ok(ok()),
        }
    }

    fn copy_tree(&self, local: &Path, remote: &Path) -> RemoteResult<()> {
        copy_recursive(local, &self.map(remote)).map_err(|e| RemoteError::Transfer(e.to_string()))
    }

    fn exists(&self, remote: &Path) -> RemoteResult<bool> {
        Ok(self.map(remote).exists())
    }

    fn create_dir_all(&self, remote: &Path) -> RemoteResult<()> {
        Ok(fs::create_dir_all(self.map(remote))?)
    }

    fn touch(&self, remote: &Path) -> RemoteResult<()> {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.map(remote))?;
        Ok(())
    }

    fn remove_all(&self, remote: &Path) -> RemoteResult<()> {
        let target = self.map(remote);
        let result = if target.is_dir() {
            fs::remove_dir_all(&target)
        } else {
            fs::remove_file(&target)
        };
        match result {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn copy_remote(&self, from: &Path, to: &Path) -> RemoteResult<()> {
        Ok(copy_recursive(&self.map(from), &self.map(to))?)
    }

    fn listening_ports(&self) -> RemoteResult<BTreeSet<u16>> {
        Ok(self
            .fleet
            .state
            .lock()
            .unwrap()
            .listening
            .get(&self.host)
            .cloned()
            .unwrap_or_default())
    }
}

/// `cp -a`-like copy: files land at `to`, directories merge into it
pub fn copy_recursive(from: &Path, to: &Path) -> std::io::Result<()> {
    if from.is_file() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        return Ok(());
    }
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        copy_recursive(&entry.path(), &to.join(entry.file_name()))?;
    }
    Ok(())
}
