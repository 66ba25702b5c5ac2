//! Operator-supplied topology of a new cluster

use crate::domain::entities::port_assignment::PortAssignment;
use crate::domain::entities::properties::{keys, PropertiesDocument};
use crate::domain::value_objects::Host;
use crate::error::{DeployError, DeployResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub hosts: Vec<Host>,
    pub ports: PortAssignment,
    pub ssd_count: u32,
    pub db_path_prefix: String,
}

impl Topology {
    pub fn new(
        hosts: Vec<Host>,
        ports: PortAssignment,
        ssd_count: u32,
        db_path_prefix: impl Into<String>,
    ) -> DeployResult<Self> {
        if hosts.is_empty() {
            return Err(DeployError::Validation(
                "at least one host is required".to_string(),
            ));
        }
        let mut seen = Vec::with_capacity(hosts.len());
        for host in &hosts {
            if host.as_str().is_empty() {
                return Err(DeployError::Validation("empty host name".to_string()));
            }
            if seen.contains(host) {
                return Err(DeployError::Validation(format!("duplicate host '{}'", host)));
            }
            seen.push(host.clone());
        }
        Ok(Self {
            hosts,
            ports,
            ssd_count,
            db_path_prefix: db_path_prefix.into(),
        })
    }

    /// Populate the keys of a freshly installed properties template.
    ///
    /// Every host carries both roles. Slave keys are only enabled when
    /// there are replicas; the db path keys are filled in but left
    /// commented out for the operator to opt into.
    pub fn write_to(&self, doc: &mut PropertiesDocument) -> DeployResult<()> {
        doc.ensure_hosts(keys::MASTER_HOSTS, &self.hosts)?;
        doc.ensure_ports(keys::MASTER_PORTS, self.ports.master())?;

        doc.ensure_hosts(keys::SLAVE_HOSTS, &self.hosts)?;
        if self.ports.slaves_enabled() {
            doc.ensure_ports(keys::SLAVE_PORTS, self.ports.slave())?;
        } else {
            doc.disable(keys::SLAVE_HOSTS)?;
            if doc.has_line(keys::SLAVE_PORTS) {
                doc.disable(keys::SLAVE_PORTS)?;
            }
        }

        doc.ensure(keys::SSD_COUNT, &self.ssd_count.to_string())?;

        for key in [keys::REDIS_DATA, keys::REDIS_DB_PATH, keys::FLASH_DB_PATH] {
            doc.ensure(key, &self.db_path_prefix)?;
            doc.disable(key)?;
        }
        Ok(())
    }
}
