//! Interactive Port Resolver
//!
//! Prompts the operator on the terminal when candidate ports are already
//! listening somewhere in the fleet.

use dialoguer::{Confirm, Input, Select};

use crate::domain::entities::{PortAssignment, PortConflict};
use crate::domain::ports::{PortResolution, PortResolver};
use crate::domain::value_objects::PortSet;

#[derive(Debug, Default)]
pub struct InteractivePortResolver;

impl InteractivePortResolver {
    pub fn new() -> Self {
        Self
    }

    fn ask_ports(current: &PortAssignment) -> dialoguer::Result<Option<PortAssignment>> {
        let master: String = Input::new()
            .with_prompt("Master ports")
            .with_initial_text(current.master().format())
            .validate_with(|input: &String| validate_ports(input))
            .interact_text()?;
        let slave: String = if current.slaves_enabled() {
            Input::new()
                .with_prompt("Slave ports")
                .with_initial_text(current.slave().format())
                .validate_with(|input: &String| validate_ports(input))
                .interact_text()?
        } else {
            String::new()
        };

        let master = PortSet::parse(&master).ok();
        let slave = if slave.trim().is_empty() {
            Some(PortSet::new())
        } else {
            PortSet::parse(&slave).ok()
        };
        let assignment = match (master, slave) {
            (Some(m), Some(s)) => PortAssignment::new(m, s, current.replicas()).ok(),
            _ => None,
        };
        if assignment.is_none() {
            eprintln!("Port lists do not fit the replica count; keeping the current assignment.");
        }
        Ok(assignment)
    }
}

fn validate_ports(input: &str) -> Result<(), String> {
    PortSet::parse(input).map(|_| ()).map_err(|e| e.to_string())
}

impl PortResolver for InteractivePortResolver {
    fn resolve(&self, conflicts: &[PortConflict], current: &PortAssignment) -> PortResolution {
        eprintln!();
        eprintln!("These ports are already in use:");
        for conflict in conflicts {
            eprintln!("  {}:{}", conflict.host, conflict.port);
        }

        let items = [
            "Continue anyway",
            "Choose other ports",
            "Abort",
        ];
        let choice = Select::new()
            .with_prompt("How do you want to proceed?")
            .items(&items)
            .default(1)
            .interact();

        match choice {
            Ok(0) => PortResolution::Accept,
            Ok(1) => match Self::ask_ports(current) {
                Ok(Some(assignment)) => PortResolution::Reassign(assignment),
                Ok(None) => PortResolution::Reassign(current.clone()),
                Err(_) => PortResolution::Abort,
            },
            _ => PortResolution::Abort,
        }
    }
}

/// Yes/no question; any prompt failure counts as "no"
pub fn confirm(prompt: &str, default: bool) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .unwrap_or(false)
}
