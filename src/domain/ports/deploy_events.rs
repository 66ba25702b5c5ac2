//! Deploy Event Port
//!
//! Provides an observable interface for deploy workflows.
//! Enables progress reporting, JSON event streams, and debugging.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::entities::{BackupKind, FailoverAttempt, PortConflict};
use crate::domain::value_objects::{ClusterId, DeployState, Host, Phase};

/// Event emitted during deploy workflows
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeployEvent {
    /// Workflow started for a cluster
    Started {
        cluster_id: ClusterId,
        workflow: String,
        hosts: Vec<Host>,
    },

    /// A phase began; `hosts` is the number of per-host workers
    PhaseStarted { phase: Phase, hosts: usize },

    PhaseCompleted { phase: Phase },

    HostStarted { phase: Phase, host: Host },

    HostCompleted { phase: Phase, host: Host },

    HostFailed {
        phase: Phase,
        host: Host,
        error: String,
    },

    /// Deploy state found on a host during validation
    StateObserved { host: Host, state: DeployState },

    /// A `Pending` host had its cluster directory wiped
    PendingDiscarded { host: Host },

    PortConflicts { conflicts: Vec<PortConflict> },

    BackupCreated {
        kind: BackupKind,
        host: Option<Host>,
        path: PathBuf,
    },

    ConfRestored { path: PathBuf, files: usize },

    /// One failover round finished
    FailoverRound {
        round: u32,
        max_rounds: u32,
        attempts: Vec<FailoverAttempt>,
    },

    TimeoutWidened {
        key: String,
        master_value: String,
        slave_value: String,
        widened: String,
    },

    TimeoutRestored { key: String },

    /// Port lists rewritten after the role swap
    TopologyPersisted {
        master_ports: String,
        slave_ports: String,
    },

    Warning { message: String },

    /// Workflow finished successfully
    Completed {
        cluster_id: ClusterId,
        workflow: String,
    },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: Progress lines on stderr
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants detailed events (e.g., per-host)
    ///
    /// Some sinks (like CI) may only want summary events.
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
