//! In-memory cluster answering the node control calls.
//!
//! A failover request promotes its target once the target has been asked
//! `promote_after` times; the replica and its master then swap roles.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::time::Duration;

use kvdeploy::domain::entities::NOT_A_SLAVE_RESPONSE;
use kvdeploy::domain::ports::{NodeControl, NodeError, NodeResult, NodeRole};
use kvdeploy::domain::value_objects::{Host, NodeAddr, PortSet};

pub const TIMEOUT_KEY: &str = "cluster-node-timeout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Stop(Host, PortSet),
    Configure(Host, PortSet),
    Start(Host, PortSet),
    Reset(Host, PortSet),
}

#[derive(Default)]
struct ClusterState {
    masters: BTreeSet<NodeAddr>,
    /// replica -> the master it follows
    replica_of: BTreeMap<NodeAddr, NodeAddr>,
    dead: BTreeSet<NodeAddr>,
    /// nodes whose next config write is refused
    refuse_set: BTreeSet<NodeAddr>,
    config: BTreeMap<(NodeAddr, String), String>,
    failover_requests: BTreeMap<NodeAddr, u32>,
    lifecycle: Vec<Lifecycle>,
}

pub struct FakeNodes {
    promote_after: u32,
    state: Mutex<ClusterState>,
}

pub fn node(s: &str) -> NodeAddr {
    s.parse().unwrap()
}

impl FakeNodes {
    /// `pairs` lists `(master, replica)`; node timeouts start at the given values
    pub fn cluster(pairs: &[(&str, &str)], master_timeout: &str, slave_timeout: &str) -> Self {
        let mut state = ClusterState::default();
        for (master, replica) in pairs {
            let (master, replica) = (node(master), node(replica));
            state
                .config
                .insert((master.clone(), TIMEOUT_KEY.to_string()), master_timeout.to_string());
            state
                .config
                .insert((replica.clone(), TIMEOUT_KEY.to_string()), slave_timeout.to_string());
            state.masters.insert(master.clone());
            state.replica_of.insert(replica, master);
        }
        Self {
            promote_after: 1,
            state: Mutex::new(state),
        }
    }

    pub fn promote_after(mut self, requests: u32) -> Self {
        self.promote_after = requests;
        self
    }

    pub fn kill(&self, addr: &str) {
        self.state.lock().unwrap().dead.insert(node(addr));
    }

    /// Refuse the next config write on `addr`; later writes succeed
    pub fn refuse_next_config_set(&self, addr: &str) {
        self.state.lock().unwrap().refuse_set.insert(node(addr));
    }

    pub fn is_master(&self, addr: &str) -> bool {
        self.state.lock().unwrap().masters.contains(&node(addr))
    }

    pub fn timeout(&self, addr: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .config
            .get(&(node(addr), TIMEOUT_KEY.to_string()))
            .cloned()
    }

    pub fn failover_requests(&self, addr: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .failover_requests
            .get(&node(addr))
            .copied()
            .unwrap_or(0)
    }

    pub fn lifecycle(&self) -> Vec<Lifecycle> {
        self.state.lock().unwrap().lifecycle.clone()
    }

    fn record(&self, event: Lifecycle) -> NodeResult<()> {
        self.state.lock().unwrap().lifecycle.push(event);
        Ok(())
    }
}

impl NodeControl for FakeNodes {
    fn is_alive(&self, node: &NodeAddr) -> NodeResult<bool> {
        Ok(!self.state.lock().unwrap().dead.contains(node))
    }

    fn role(&self, node: &NodeAddr) -> NodeResult<NodeRole> {
        if self.state.lock().unwrap().masters.contains(node) {
            Ok(NodeRole::Master)
        } else {
            Ok(NodeRole::Slave)
        }
    }

    fn alive_slaves(&self, master: &NodeAddr) -> NodeResult<Vec<NodeAddr>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .replica_of
            .iter()
            .filter(|(replica, m)| *m == master && !state.dead.contains(*replica))
            .map(|(replica, _)| replica.clone())
            .collect())
    }

    fn config_get(&self, node: &NodeAddr, key: &str) -> NodeResult<String> {
        self.state
            .lock()
            .unwrap()
            .config
            .get(&(node.clone(), key.to_string()))
            .cloned()
            .ok_or_else(|| NodeError::UnexpectedReply(format!("no {} on {}", key, node)))
    }

    fn config_set(&self, node: &NodeAddr, key: &str, value: &str) -> NodeResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_set.remove(node) {
            return Err(NodeError::UnexpectedReply("ERR config set refused".to_string()));
        }
        state
            .config
            .insert((node.clone(), key.to_string()), value.to_string());
        Ok(())
    }

    fn failover(&self, target: &NodeAddr) -> NodeResult<String> {
        let mut state = self.state.lock().unwrap();
        let count = state.failover_requests.entry(target.clone()).or_insert(0);
        *count += 1;
        if *count < self.promote_after {
            return Ok("OK".to_string());
        }
        if let Some(old_master) = state.replica_of.remove(target) {
            state.masters.remove(&old_master);
            state.replica_of.insert(old_master, target.clone());
            state.masters.insert(target.clone());
        }
        Ok(NOT_A_SLAVE_RESPONSE.to_string())
    }

    fn stop(&self, host: &Host, ports: &PortSet) -> NodeResult<()> {
        self.record(Lifecycle::Stop(host.clone(), ports.clone()))
    }

    fn configure(&self, host: &Host, ports: &PortSet) -> NodeResult<()> {
        self.record(Lifecycle::Configure(host.clone(), ports.clone()))
    }

    fn start(&self, host: &Host, ports: &PortSet) -> NodeResult<()> {
        self.record(Lifecycle::Start(host.clone(), ports.clone()))
    }

    fn reset(&self, host: &Host, ports: &PortSet) -> NodeResult<()> {
        self.record(Lifecycle::Reset(host.clone(), ports.clone()))
    }

    fn wait_until_up(&self, nodes: &[NodeAddr], timeout: Duration) -> NodeResult<()> {
        let state = self.state.lock().unwrap();
        let pending: Vec<String> = nodes
            .iter()
            .filter(|n| state.dead.contains(*n))
            .map(|n| n.to_string())
            .collect();
        if pending.is_empty() {
            Ok(())
        } else {
            Err(NodeError::NotUp {
                after: timeout,
                pending,
            })
        }
    }
}
