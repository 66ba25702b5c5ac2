//! Host Resolver Implementation
//!
//! A host is local when its name is this machine's name, or when it
//! resolves to a loopback address or one of this machine's addresses.

use std::collections::BTreeSet;
use std::net::{IpAddr, ToSocketAddrs};
use std::process::Command;

use crate::domain::ports::HostResolver;
use crate::domain::value_objects::Host;

#[derive(Debug, Clone, Default)]
pub struct SystemHostResolver {
    names: BTreeSet<String>,
    addresses: BTreeSet<IpAddr>,
}

impl SystemHostResolver {
    /// Probe the machine's hostname and interface addresses
    pub fn detect() -> Self {
        let hostname = command_stdout("hostname", &[]).unwrap_or_default();
        let addresses = command_stdout("hostname", &["-I"])
            .map(|out| parse_addresses(&out))
            .unwrap_or_default();
        Self::with_identity(hostname.split_whitespace().map(str::to_string), addresses)
    }

    pub fn with_identity(
        names: impl IntoIterator<Item = String>,
        addresses: impl IntoIterator<Item = IpAddr>,
    ) -> Self {
        let mut names: BTreeSet<String> = names.into_iter().collect();
        names.insert("localhost".to_string());
        Self {
            names,
            addresses: addresses.into_iter().collect(),
        }
    }

    fn resolves_locally(&self, host: &Host) -> bool {
        match (host.as_str(), 0).to_socket_addrs() {
            Ok(mut addrs) => addrs.any(|a| a.ip().is_loopback() || self.addresses.contains(&a.ip())),
            Err(_) => false,
        }
    }
}

impl HostResolver for SystemHostResolver {
    fn is_local(&self, host: &Host) -> bool {
        self.names.contains(host.as_str()) || self.resolves_locally(host)
    }
}

fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn parse_addresses(output: &str) -> Vec<IpAddr> {
    output
        .split_whitespace()
        .filter_map(|word| word.parse().ok())
        .collect()
}
