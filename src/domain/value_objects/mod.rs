//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod cluster_id;
mod deploy_state;
mod host;
mod phase;
mod port_set;

pub use cluster_id::ClusterId;
pub use deploy_state::DeployState;
pub use host::{Host, NodeAddr};
pub use phase::Phase;
pub use port_set::PortSet;
