//! Port set value object with compact range notation
//!
//! Contiguous runs collapse to `start-end`, the whole value is a comma-joined
//! mix of runs and singletons: `{10, 11, 12, 15}` <-> `"10-12,15"`.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::{DeployError, DeployResult};

/// Ordered set of ports
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PortSet(BTreeSet<u16>);

impl PortSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse compact notation. Whitespace around tokens is ignored and an
    /// empty string yields an empty set.
    pub fn parse(value: &str) -> DeployResult<Self> {
        let mut ports = BTreeSet::new();
        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.split_once('-') {
                Some((start, end)) => {
                    let start = parse_port(start, value)?;
                    let end = parse_port(end, value)?;
                    if start > end {
                        return Err(DeployError::Validation(format!(
                            "reversed port range '{}' in '{}'",
                            token, value
                        )));
                    }
                    ports.extend(start..=end);
                }
                None => {
                    ports.insert(parse_port(token, value)?);
                }
            }
        }
        Ok(Self(ports))
    }

    /// Canonical compact notation
    pub fn format(&self) -> String {
        let mut runs: Vec<String> = Vec::new();
        let mut iter = self.0.iter().copied();
        let Some(first) = iter.next() else {
            return String::new();
        };

        let (mut start, mut prev) = (first, first);
        for port in iter {
            if port as u32 == prev as u32 + 1 {
                prev = port;
                continue;
            }
            runs.push(format_run(start, prev));
            start = port;
            prev = port;
        }
        runs.push(format_run(start, prev));
        runs.join(",")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, port: u16) -> bool {
        self.0.contains(&port)
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + Clone + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &PortSet) -> PortSet {
        PortSet(self.0.union(&other.0).copied().collect())
    }

    pub fn difference(&self, other: &PortSet) -> PortSet {
        PortSet(self.0.difference(&other.0).copied().collect())
    }

    pub fn intersection(&self, other: &PortSet) -> PortSet {
        PortSet(self.0.intersection(&other.0).copied().collect())
    }

    pub fn to_vec(&self) -> Vec<u16> {
        self.0.iter().copied().collect()
    }
}

fn parse_port(token: &str, whole: &str) -> DeployResult<u16> {
    token
        .trim()
        .parse::<u16>()
        .map_err(|_| DeployError::Validation(format!("invalid port '{}' in '{}'", token, whole)))
}

fn format_run(start: u16, end: u16) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

impl FromIterator<u16> for PortSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for PortSet {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PortSet::parse(s)
    }
}

impl std::fmt::Display for PortSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}
