//! Port assignment entity

use serde::Serialize;

use crate::domain::entities::properties::{keys, PropertiesDocument};
use crate::domain::value_objects::{Host, PortSet};
use crate::error::{DeployError, DeployResult};

/// Master and slave port sets of one cluster
///
/// Invariant: `slave.len() == replicas * master.len()`; with zero replicas
/// there are no slave ports. Master and slave ports never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortAssignment {
    master: PortSet,
    slave: PortSet,
    replicas: u32,
}

impl PortAssignment {
    pub fn new(master: PortSet, slave: PortSet, replicas: u32) -> DeployResult<Self> {
        if master.is_empty() {
            return Err(DeployError::Validation(
                "at least one master port is required".to_string(),
            ));
        }
        let expected = replicas as usize * master.len();
        if slave.len() != expected {
            return Err(DeployError::Validation(format!(
                "{} replica(s) x {} master port(s) requires {} slave port(s), got {}",
                replicas,
                master.len(),
                expected,
                slave.len()
            )));
        }
        let overlap = master.intersection(&slave);
        if !overlap.is_empty() {
            return Err(DeployError::Validation(format!(
                "ports {} assigned to both masters and slaves",
                overlap
            )));
        }
        Ok(Self {
            master,
            slave,
            replicas,
        })
    }

    /// Read ports from an existing properties document; replicas are derived
    pub fn from_properties(doc: &PropertiesDocument) -> DeployResult<Self> {
        let master = doc.get_ports(keys::MASTER_PORTS)?;
        let slave = doc.get_ports(keys::SLAVE_PORTS)?;
        if master.is_empty() {
            return Err(DeployError::Validation(format!(
                "'{}' is missing or empty",
                keys::MASTER_PORTS
            )));
        }
        let replicas = (slave.len() / master.len()) as u32;
        Self::new(master, slave, replicas)
    }

    pub fn master(&self) -> &PortSet {
        &self.master
    }

    pub fn slave(&self) -> &PortSet {
        &self.slave
    }

    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    pub fn slaves_enabled(&self) -> bool {
        self.replicas > 0
    }

    pub fn all_ports(&self) -> PortSet {
        self.master.union(&self.slave)
    }

    /// Assignment after failover: `new_master` ports take the master role and
    /// every other port of the cluster becomes a slave port.
    pub fn swapped(&self, new_master: &PortSet) -> DeployResult<Self> {
        let all = self.all_ports();
        let slave = all.difference(new_master);
        Self::new(new_master.clone(), slave, self.replicas)
    }

    /// Write ports into `doc`, enabling the keys; without replicas the
    /// slave ports key is commented out
    pub fn write_to(&self, doc: &mut PropertiesDocument) -> DeployResult<()> {
        doc.ensure_ports(keys::MASTER_PORTS, &self.master)?;
        if self.slaves_enabled() {
            doc.ensure_ports(keys::SLAVE_PORTS, &self.slave)?;
        } else if doc.is_enabled(keys::SLAVE_PORTS) {
            doc.disable(keys::SLAVE_PORTS)?;
        }
        Ok(())
    }
}

/// A candidate port already in use on a host
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PortConflict {
    pub host: Host,
    pub port: u16,
}

impl PortConflict {
    pub fn new(host: Host, port: u16) -> Self {
        Self { host, port }
    }
}
