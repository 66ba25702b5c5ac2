//! Backup archive entity
//!
//! An archive is a directory tree copy named deterministically from
//! `(cluster id, kind, tag)`. Archives are never modified after creation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::ClusterId;
use crate::error::{DeployError, DeployResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    /// Configuration directory, archived on the orchestrating machine
    Conf,
    /// Cluster runtime/data directory, archived on each host
    Data,
}

/// Timestamp or operator-chosen label distinguishing archives of one cluster
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BackupTag(String);

impl BackupTag {
    pub fn new(tag: impl Into<String>) -> DeployResult<Self> {
        let tag = tag.into();
        let valid = !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(DeployError::Validation(format!(
                "invalid backup tag '{}'",
                tag
            )));
        }
        Ok(Self(tag))
    }

    /// `%Y%m%d%H%M%S` in UTC
    pub fn at(time: DateTime<Utc>) -> Self {
        Self(time.format("%Y%m%d%H%M%S").to_string())
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BackupTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupArchive {
    pub cluster_id: ClusterId,
    pub kind: BackupKind,
    pub tag: BackupTag,
}

impl BackupArchive {
    pub fn new(cluster_id: ClusterId, kind: BackupKind, tag: BackupTag) -> Self {
        Self {
            cluster_id,
            kind,
            tag,
        }
    }

    /// Directory name of the archive
    pub fn dir_name(&self) -> String {
        match self.kind {
            BackupKind::Conf => format!("cluster_{}_conf_bak_{}", self.cluster_id, self.tag),
            BackupKind::Data => format!("cluster_{}_bak_{}", self.cluster_id, self.tag),
        }
    }

    /// Inverse of [`BackupArchive::dir_name`]
    pub fn from_dir_name(cluster_id: ClusterId, kind: BackupKind, name: &str) -> Option<Self> {
        let prefix = match kind {
            BackupKind::Conf => format!("cluster_{}_conf_bak_", cluster_id),
            BackupKind::Data => format!("cluster_{}_bak_", cluster_id),
        };
        let tag = name.strip_prefix(&prefix)?;
        BackupTag::new(tag)
            .ok()
            .map(|tag| Self::new(cluster_id, kind, tag))
    }
}
