//! Port Resolver port
//!
//! Decides what to do when a candidate port assignment collides with
//! ports already listening in the fleet. Implementations can be
//! interactive (prompting the operator) or a fixed policy.

use crate::domain::entities::{PortAssignment, PortConflict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortResolution {
    /// Proceed with the current assignment despite the conflicts
    Accept,
    /// Try again with a new assignment
    Reassign(PortAssignment),
    /// Stop the workflow
    Abort,
}

pub trait PortResolver: Send + Sync {
    fn resolve(&self, conflicts: &[PortConflict], current: &PortAssignment) -> PortResolution;
}

/// Always accepts; used when the operator forces the deploy
pub struct AcceptConflicts;

impl PortResolver for AcceptConflicts {
    fn resolve(&self, _conflicts: &[PortConflict], _current: &PortAssignment) -> PortResolution {
        PortResolution::Accept
    }
}

/// Always aborts; the non-interactive default
pub struct RejectConflicts;

impl PortResolver for RejectConflicts {
    fn resolve(&self, _conflicts: &[PortConflict], _current: &PortAssignment) -> PortResolution {
        PortResolution::Abort
    }
}
