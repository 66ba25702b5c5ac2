//! Parsing of `cluster nodes` output
//!
//! One node per line:
//! `<id> <ip:port@cport> <flags> <master-id|-> <ping> <pong> <epoch> <link-state> [slots...]`

use crate::domain::value_objects::{Host, NodeAddr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterNode {
    pub id: String,
    pub addr: NodeAddr,
    pub flags: Vec<String>,
    /// Id of the master this node replicates, if any
    pub master_id: Option<String>,
    pub connected: bool,
}

impl ClusterNode {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn is_failing(&self) -> bool {
        self.has_flag("fail") || self.has_flag("fail?")
    }
}

/// Parse every well-formed line; malformed lines are skipped
pub fn parse_cluster_nodes(output: &str) -> Vec<ClusterNode> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<ClusterNode> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        return None;
    }
    let endpoint = fields[1].split('@').next()?;
    let (host, port) = endpoint.rsplit_once(':')?;
    let port = port.parse().ok()?;
    let master_id = match fields[3] {
        "-" => None,
        id => Some(id.to_string()),
    };
    Some(ClusterNode {
        id: fields[0].to_string(),
        addr: NodeAddr::new(Host::new(host), port),
        flags: fields[2].split(',').map(str::to_string).collect(),
        master_id,
        connected: fields[7] == "connected",
    })
}

/// Connected, healthy replicas of the node flagged `myself`
pub fn alive_replicas_of_self(nodes: &[ClusterNode]) -> Vec<NodeAddr> {
    let Some(me) = nodes.iter().find(|n| n.has_flag("myself")) else {
        return Vec::new();
    };
    nodes
        .iter()
        .filter(|n| n.has_flag("slave") && !n.is_failing() && n.connected)
        .filter(|n| n.master_id.as_deref() == Some(me.id.as_str()))
        .map(|n| n.addr.clone())
        .collect()
}
