//! Host Resolver port

use crate::domain::value_objects::Host;

/// Decides whether a fleet host is the orchestrating machine
pub trait HostResolver: Send + Sync {
    fn is_local(&self, host: &Host) -> bool;
}

/// Fixed set of names treated as local
#[derive(Debug, Clone, Default)]
pub struct StaticHostResolver {
    local: Vec<Host>,
}

impl StaticHostResolver {
    pub fn new(local: impl IntoIterator<Item = Host>) -> Self {
        Self {
            local: local.into_iter().collect(),
        }
    }
}

impl HostResolver for StaticHostResolver {
    fn is_local(&self, host: &Host) -> bool {
        self.local.contains(host)
    }
}
