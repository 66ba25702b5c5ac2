//! Node control adapters

mod cli_control;
mod cluster_nodes;

pub use cli_control::{CliNodeControl, NodeCommands};
pub use cluster_nodes::{alive_replicas_of_self, parse_cluster_nodes, ClusterNode};
