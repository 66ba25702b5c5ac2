//! Workflow phases
//!
//! Standard deploy: `Validating -> Negotiating -> Installing -> ConfSyncing -> Completing`.
//! Zero-downtime redeploy runs its own numbered phases after `Validating`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Validating,
    Negotiating,
    CollisionCheck,
    Cleaning,
    BackingUp,
    Installing,
    WritingProperties,
    ConfSyncing,
    Completing,
    // zero-downtime
    Snapshot,
    InstallMasters,
    RestartSlaves,
    VerifyReplicas,
    WidenTimeout,
    Failover,
    RestoreTimeout,
    RestartMasters,
    PersistTopology,
    // standalone
    Restoring,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Validating => "validating",
            Phase::Negotiating => "negotiating",
            Phase::CollisionCheck => "collision-check",
            Phase::Cleaning => "cleaning",
            Phase::BackingUp => "backing-up",
            Phase::Installing => "installing",
            Phase::WritingProperties => "writing-properties",
            Phase::ConfSyncing => "conf-syncing",
            Phase::Completing => "completing",
            Phase::Snapshot => "snapshot",
            Phase::InstallMasters => "install-masters",
            Phase::RestartSlaves => "restart-slaves",
            Phase::VerifyReplicas => "verify-replicas",
            Phase::WidenTimeout => "widen-timeout",
            Phase::Failover => "failover",
            Phase::RestoreTimeout => "restore-timeout",
            Phase::RestartMasters => "restart-masters",
            Phase::PersistTopology => "persist-topology",
            Phase::Restoring => "restoring",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
