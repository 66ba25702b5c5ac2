//! Node control through the node's command-line client
//!
//! Every call opens a session to the node's host and runs a command built
//! from a template. Placeholders: `{cli}`, `{host}`, `{port}`,
//! `{cluster_path}`, `{conf_path}`.

use std::thread;
use std::time::{Duration, Instant};

use super::cluster_nodes::{alive_replicas_of_self, parse_cluster_nodes};
use crate::domain::entities::ClusterPaths;
use crate::domain::ports::{
    shell_quote, NodeControl, NodeError, NodeResult, NodeRole, RemoteExecutor, Session,
};
use crate::domain::value_objects::{Host, NodeAddr, PortSet};

/// Command templates for node process lifecycle and queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCommands {
    pub cli: String,
    pub start: String,
    pub stop: String,
    pub configure: String,
    pub reset: String,
}

impl Default for NodeCommands {
    fn default() -> Self {
        Self {
            cli: "{cluster_path}/bin/redis-cli".to_string(),
            start: "{cluster_path}/bin/redis-server {conf_path}/redis-{port}.conf".to_string(),
            stop: "{cli} -h {host} -p {port} shutdown".to_string(),
            configure: "sh {conf_path}/configure.sh {port}".to_string(),
            reset: "rm -f {cluster_path}/nodes-{port}.conf".to_string(),
        }
    }
}

pub struct CliNodeControl<'a> {
    executor: &'a dyn RemoteExecutor,
    commands: NodeCommands,
    paths: ClusterPaths,
    poll_interval: Duration,
}

impl<'a> CliNodeControl<'a> {
    pub fn new(executor: &'a dyn RemoteExecutor, commands: NodeCommands, paths: ClusterPaths) -> Self {
        Self {
            executor,
            commands,
            paths,
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn render(&self, template: &str, host: &Host, port: u16) -> String {
        let cli = self.fill(&self.commands.cli, host, port);
        self.fill(&template.replace("{cli}", &cli), host, port)
    }

    fn fill(&self, template: &str, host: &Host, port: u16) -> String {
        template
            .replace("{host}", host.as_str())
            .replace("{port}", &port.to_string())
            .replace("{cluster_path}", &self.paths.cluster_path.to_string_lossy())
            .replace("{conf_path}", &self.paths.conf_path.to_string_lossy())
    }

    fn session(&self, host: &Host) -> NodeResult<Box<dyn Session>> {
        Ok(self.executor.connect(host)?)
    }

    /// Run `{cli} -h host -p port <args>` on the node's host
    fn query(&self, node: &NodeAddr, args: &str) -> NodeResult<String> {
        let command = format!("{{cli}} -h {{host}} -p {{port}} {}", args);
        let command = self.render(&command, &node.host, node.port);
        let output = self.session(&node.host)?.run(&command)?;
        Ok(output.trim().to_string())
    }

    /// Run a lifecycle template once per port on one host
    fn each_port(&self, template: &str, host: &Host, ports: &PortSet, tolerant: bool) -> NodeResult<()> {
        let session = self.session(host)?;
        for port in ports.iter() {
            let command = self.render(template, host, port);
            if tolerant {
                session.run_tolerant(&command)?;
            } else {
                session.run(&command)?;
            }
        }
        Ok(())
    }
}

impl NodeControl for CliNodeControl<'_> {
    fn is_alive(&self, node: &NodeAddr) -> NodeResult<bool> {
        let session = self.session(&node.host)?;
        let command = self.render("{cli} -h {host} -p {port} ping", &node.host, node.port);
        let output = session.run_tolerant(&command)?;
        Ok(output.success() && output.stdout.trim() == "PONG")
    }

    fn role(&self, node: &NodeAddr) -> NodeResult<NodeRole> {
        let reply = self.query(node, "role")?;
        match reply.lines().next().map(str::trim) {
            Some("master") => Ok(NodeRole::Master),
            Some("slave") => Ok(NodeRole::Slave),
            _ => Err(NodeError::UnexpectedReply(reply)),
        }
    }

    fn alive_slaves(&self, master: &NodeAddr) -> NodeResult<Vec<NodeAddr>> {
        let reply = self.query(master, "cluster nodes")?;
        Ok(alive_replicas_of_self(&parse_cluster_nodes(&reply)))
    }

    fn config_get(&self, node: &NodeAddr, key: &str) -> NodeResult<String> {
        let reply = self.query(node, &format!("config get {}", shell_quote(key)))?;
        // key on the first line, value on the second
        let mut lines = reply.lines();
        match (lines.next(), lines.next()) {
            (Some(k), Some(value)) if k.trim() == key => Ok(value.trim().to_string()),
            _ => Err(NodeError::UnexpectedReply(reply)),
        }
    }

    fn config_set(&self, node: &NodeAddr, key: &str, value: &str) -> NodeResult<()> {
        let reply = self.query(
            node,
            &format!("config set {} {}", shell_quote(key), shell_quote(value)),
        )?;
        if reply == "OK" {
            Ok(())
        } else {
            Err(NodeError::UnexpectedReply(reply))
        }
    }

    fn failover(&self, node: &NodeAddr) -> NodeResult<String> {
        let session = self.session(&node.host)?;
        let command = self.render("{cli} -h {host} -p {port} cluster failover", &node.host, node.port);
        let output = session.run_tolerant(&command)?;
        let reply = output.stdout.trim();
        if reply.is_empty() {
            Ok(output.stderr.trim().to_string())
        } else {
            Ok(reply.to_string())
        }
    }

    fn stop(&self, host: &Host, ports: &PortSet) -> NodeResult<()> {
        // a node that is already down is fine
        self.each_port(&self.commands.stop, host, ports, true)
    }

    fn configure(&self, host: &Host, ports: &PortSet) -> NodeResult<()> {
        self.each_port(&self.commands.configure, host, ports, false)
    }

    fn start(&self, host: &Host, ports: &PortSet) -> NodeResult<()> {
        self.each_port(&self.commands.start, host, ports, false)
    }

    fn reset(&self, host: &Host, ports: &PortSet) -> NodeResult<()> {
        self.each_port(&self.commands.reset, host, ports, false)
    }

    fn wait_until_up(&self, nodes: &[NodeAddr], timeout: Duration) -> NodeResult<()> {
        let deadline = Instant::now() + timeout;
        let mut pending: Vec<NodeAddr> = nodes.to_vec();
        loop {
            let mut still_down = Vec::new();
            for node in pending {
                if !self.is_alive(&node)? {
                    still_down.push(node);
                }
            }
            pending = still_down;
            if pending.is_empty() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(NodeError::NotUp {
                    after: timeout,
                    pending: pending.iter().map(|n| n.to_string()).collect(),
                });
            }
            thread::sleep(self.poll_interval);
        }
    }
}
