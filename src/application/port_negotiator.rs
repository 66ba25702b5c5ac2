//! Port negotiation
//!
//! `check_conflicts` probes every host for listeners on candidate ports
//! and changes nothing. `negotiate` repeats the probe with whatever
//! assignment the resolver hands back until the fleet is clear, the
//! resolver accepts the conflicts, or it gives up.

use crate::application::services::Services;
use crate::domain::entities::{PortAssignment, PortConflict};
use crate::domain::ports::{DeployEvent, PortResolution, PortResolver};
use crate::domain::value_objects::{Host, Phase};
use crate::error::{DeployError, DeployResult};

/// Outcome of a negotiation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedPorts {
    pub ports: PortAssignment,
    /// Conflicts the resolver chose to live with
    pub accepted: Vec<PortConflict>,
}

pub struct PortNegotiator<'s, 'a> {
    services: &'s Services<'a>,
}

impl<'s, 'a> PortNegotiator<'s, 'a> {
    pub fn new(services: &'s Services<'a>) -> Self {
        Self { services }
    }

    /// Every `(host, port)` pair where a candidate port is already listening
    pub fn check_conflicts(
        &self,
        hosts: &[Host],
        candidate: &PortAssignment,
    ) -> DeployResult<Vec<PortConflict>> {
        let wanted = candidate.all_ports();
        let per_host = self
            .services
            .runner()
            .run(Phase::Negotiating, hosts, |host| {
                let session = self.services.connect(Phase::Negotiating, host)?;
                let listening = session
                    .listening_ports()
                    .map_err(|e| DeployError::remote(Phase::Negotiating, host, e))?;
                Ok(wanted
                    .iter()
                    .filter(|port| listening.contains(port))
                    .map(|port| PortConflict::new(host.clone(), port))
                    .collect::<Vec<_>>())
            })?;
        Ok(per_host.into_iter().flatten().collect())
    }

    pub fn negotiate(
        &self,
        hosts: &[Host],
        initial: PortAssignment,
        resolver: &dyn PortResolver,
    ) -> DeployResult<NegotiatedPorts> {
        let mut current = initial;
        loop {
            let conflicts = self.check_conflicts(hosts, &current)?;
            if conflicts.is_empty() {
                return Ok(NegotiatedPorts {
                    ports: current,
                    accepted: Vec::new(),
                });
            }
            self.services.events.on_event(DeployEvent::PortConflicts {
                conflicts: conflicts.clone(),
            });

            match resolver.resolve(&conflicts, &current) {
                PortResolution::Accept => {
                    return Ok(NegotiatedPorts {
                        ports: current,
                        accepted: conflicts,
                    })
                }
                PortResolution::Abort => return Err(DeployError::PortConflict { conflicts }),
                PortResolution::Reassign(next) => current = next,
            }
        }
    }
}
