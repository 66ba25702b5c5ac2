//! Properties document entity
//!
//! A line-oriented `key = value` file. A key commented out with `#` is
//! "disabled": present but not in effect. Untouched lines render byte-for-byte,
//! including CRLF endings, and toggling a key only (un)comments its line.

use std::path::{Path, PathBuf};

use crate::domain::value_objects::{Host, PortSet};
use crate::error::{DeployError, DeployResult};

/// Well-known keys read and written by the orchestrator
pub mod keys {
    pub const MASTER_HOSTS: &str = "sr2_redis_master_hosts";
    pub const MASTER_PORTS: &str = "sr2_redis_master_ports";
    pub const SLAVE_HOSTS: &str = "sr2_redis_slave_hosts";
    pub const SLAVE_PORTS: &str = "sr2_redis_slave_ports";
    pub const SSD_COUNT: &str = "ssd_count";
    pub const REDIS_DATA: &str = "sr2_redis_data";
    pub const REDIS_DB_PATH: &str = "sr2_redis_db_path";
    pub const FLASH_DB_PATH: &str = "sr2_flash_db_path";
}

/// One key line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    key: String,
    value: String,
    enabled: bool,
    /// Original text including any `\r`, dropped once the entry is modified
    raw: Option<String>,
}

impl PropertyEntry {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `cr` is appended to rewritten lines so they match the document's endings
    fn render(&self, cr: &str) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None if self.enabled => format!("{} = {}{}", self.key, self.value, cr),
            None => format!("#{} = {}{}", self.key, self.value, cr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Entry(PropertyEntry),
    /// Blank line or free-form comment, kept verbatim
    Other(String),
}

/// Split on `\n` only, keeping each line's `\r`
fn raw_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.strip_suffix('\n').unwrap_or(text).split('\n').collect()
}

/// Ordered `(key, value, enabled)` entries backed by a line-oriented file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesDocument {
    lines: Vec<Line>,
    trailing_newline: bool,
    crlf: bool,
}

impl PropertiesDocument {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            trailing_newline: true,
            crlf: false,
        }
    }

    /// Parse document text
    pub fn parse(text: &str) -> DeployResult<Self> {
        Self::parse_inner(text, None)
    }

    /// Parse document text, reporting errors against `path`
    pub fn parse_at(text: &str, path: &Path) -> DeployResult<Self> {
        Self::parse_inner(text, Some(path.to_path_buf()))
    }

    fn parse_inner(text: &str, path: Option<PathBuf>) -> DeployResult<Self> {
        let mut doc = PropertiesDocument {
            lines: Vec::new(),
            trailing_newline: text.is_empty() || text.ends_with('\n'),
            crlf: text.contains("\r\n"),
        };

        for (index, raw) in raw_lines(text).into_iter().enumerate() {
            let line_no = index + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                doc.lines.push(Line::Other(raw.to_string()));
                continue;
            }

            if let Some(body) = trimmed.strip_prefix('#') {
                let body = body.trim_start_matches('#').trim_start();
                match split_key_value(body) {
                    Some((key, value)) => doc.lines.push(Line::Entry(PropertyEntry {
                        key,
                        value,
                        enabled: false,
                        raw: Some(raw.to_string()),
                    })),
                    None => doc.lines.push(Line::Other(raw.to_string())),
                }
                continue;
            }

            let (key, value) = split_key_value(trimmed).ok_or_else(|| {
                DeployError::corrupt(
                    path.clone(),
                    Some(line_no),
                    format!("expected 'key = value', found '{}'", trimmed),
                )
            })?;

            if doc.enabled_index(&key).is_some() {
                return Err(DeployError::corrupt(
                    path.clone(),
                    Some(line_no),
                    format!("duplicate key '{}'", key),
                ));
            }

            doc.lines.push(Line::Entry(PropertyEntry {
                key,
                value,
                enabled: true,
                raw: Some(raw.to_string()),
            }));
        }

        Ok(doc)
    }

    /// Render back to file text
    pub fn render(&self) -> String {
        let cr = if self.crlf { "\r" } else { "" };
        let mut out = self
            .lines
            .iter()
            .map(|line| match line {
                Line::Entry(entry) => entry.render(cr),
                Line::Other(raw) => raw.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            out.push('\n');
        }
        out
    }

    /// All key entries in file order
    pub fn entries(&self) -> impl Iterator<Item = &PropertyEntry> {
        self.lines.iter().filter_map(|line| match line {
            Line::Entry(entry) => Some(entry),
            Line::Other(_) => None,
        })
    }

    /// Value of an enabled key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.enabled_index(key)
            .and_then(|i| self.entry_at(i))
            .map(|e| e.value.as_str())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Comma-separated list value; missing or disabled keys yield an empty list
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_hosts(&self, key: &str) -> Vec<Host> {
        self.get_list(key).into_iter().map(Host::new).collect()
    }

    /// Port set in compact notation; missing or disabled keys yield an empty set
    pub fn get_ports(&self, key: &str) -> DeployResult<PortSet> {
        match self.get(key) {
            Some(value) => PortSet::parse(value),
            None => Ok(PortSet::new()),
        }
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.enabled_index(key).is_some()
    }

    /// Whether any line (enabled or not) carries `key`
    pub fn has_line(&self, key: &str) -> bool {
        self.entries().any(|e| e.key == key)
    }

    /// Overwrite the value of `key`, leaving its enabled state untouched.
    ///
    /// Targets the enabled line if there is one, otherwise the first disabled
    /// line. Fails with `KeyNotFound` when no line carries the key.
    pub fn set(&mut self, key: &str, value: &str) -> DeployResult<()> {
        check_value(key, value)?;
        let index = self
            .enabled_index(key)
            .or_else(|| self.disabled_index(key))
            .ok_or_else(|| DeployError::KeyNotFound(key.to_string()))?;
        if let Some(entry) = self.entry_at_mut(index) {
            if entry.value != value {
                entry.value = value.to_string();
                entry.raw = None;
            }
        }
        Ok(())
    }

    /// Uncomment `key`. No-op if already enabled.
    pub fn enable(&mut self, key: &str) -> DeployResult<()> {
        if self.enabled_index(key).is_some() {
            return Ok(());
        }
        let index = self
            .disabled_index(key)
            .ok_or_else(|| DeployError::KeyNotFound(key.to_string()))?;
        if let Some(entry) = self.entry_at_mut(index) {
            entry.enabled = true;
            entry.raw = None;
        }
        Ok(())
    }

    /// Comment out `key`. No-op if already disabled.
    pub fn disable(&mut self, key: &str) -> DeployResult<()> {
        match self.enabled_index(key) {
            Some(index) => {
                if let Some(entry) = self.entry_at_mut(index) {
                    entry.enabled = false;
                    entry.raw = None;
                }
                Ok(())
            }
            None if self.has_line(key) => Ok(()),
            None => Err(DeployError::KeyNotFound(key.to_string())),
        }
    }

    /// Enable `key` with `value`, appending a new line if the key has none
    pub fn ensure(&mut self, key: &str, value: &str) -> DeployResult<()> {
        if !self.has_line(key) {
            check_value(key, value)?;
            if !is_valid_key(key) {
                return Err(DeployError::Validation(format!("invalid key '{}'", key)));
            }
            self.lines.push(Line::Entry(PropertyEntry {
                key: key.to_string(),
                value: value.to_string(),
                enabled: true,
                raw: None,
            }));
            return Ok(());
        }
        self.enable(key)?;
        self.set(key, value)
    }

    pub fn set_ports(&mut self, key: &str, ports: &PortSet) -> DeployResult<()> {
        self.set(key, &ports.format())
    }

    pub fn ensure_ports(&mut self, key: &str, ports: &PortSet) -> DeployResult<()> {
        self.ensure(key, &ports.format())
    }

    pub fn ensure_hosts(&mut self, key: &str, hosts: &[Host]) -> DeployResult<()> {
        let value = hosts
            .iter()
            .map(|h| h.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.ensure(key, &value)
    }

    /// Copy every enabled entry of `other` into this document
    pub fn overlay(&mut self, other: &PropertiesDocument) -> DeployResult<()> {
        for entry in other.entries().filter(|e| e.enabled) {
            self.ensure(&entry.key, &entry.value)?;
        }
        Ok(())
    }

    fn entry_at(&self, index: usize) -> Option<&PropertyEntry> {
        match self.lines.get(index) {
            Some(Line::Entry(entry)) => Some(entry),
            _ => None,
        }
    }

    fn entry_at_mut(&mut self, index: usize) -> Option<&mut PropertyEntry> {
        match self.lines.get_mut(index) {
            Some(Line::Entry(entry)) => Some(entry),
            _ => None,
        }
    }

    fn enabled_index(&self, key: &str) -> Option<usize> {
        self.lines.iter().position(|line| {
            matches!(line, Line::Entry(e) if e.enabled && e.key == key)
        })
    }

    fn disabled_index(&self, key: &str) -> Option<usize> {
        self.lines.iter().position(|line| {
            matches!(line, Line::Entry(e) if !e.enabled && e.key == key)
        })
    }
}

fn split_key_value(text: &str) -> Option<(String, String)> {
    let (key, value) = text.split_once('=')?;
    let key = key.trim();
    if !is_valid_key(key) {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn check_value(key: &str, value: &str) -> DeployResult<()> {
    if value.contains('\n') || value.contains('\r') {
        return Err(DeployError::Validation(format!(
            "value for '{}' must be a single line",
            key
        )));
    }
    // Parsing trims values, so padding would not survive a reload
    if value.trim() != value {
        return Err(DeployError::Validation(format!(
            "value for '{}' has leading or trailing whitespace",
            key
        )));
    }
    Ok(())
}
