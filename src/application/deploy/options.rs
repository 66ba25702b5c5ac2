//! Deploy Options
//!
//! Inputs for the standard deploy workflow, already validated by the
//! front end.

use std::path::PathBuf;

use crate::domain::entities::{BackupTag, PropertiesDocument, Topology};
use crate::domain::value_objects::ClusterId;

/// Where the cluster's properties come from after install
#[derive(Debug, Clone)]
pub enum PropertiesSource {
    /// Fresh cluster: populate the installed template from a topology
    New(Topology),
    /// Redeploy: restore the conf archive taken during this run
    Restore,
    /// Redeploy: write an operator-edited document
    Edited(PropertiesDocument),
}

/// Options for the deploy use case
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub cluster_id: ClusterId,
    /// Local installer artifact shipped to every host
    pub installer: PathBuf,
    pub properties: PropertiesSource,
    /// Stop nodes, drop logs and reset node state before backing up
    pub clean: bool,
    /// Archive tag; a UTC timestamp when unset
    pub tag: Option<BackupTag>,
}

impl DeployOptions {
    pub fn new(cluster_id: ClusterId, installer: impl Into<PathBuf>, properties: PropertiesSource) -> Self {
        Self {
            cluster_id,
            installer: installer.into(),
            properties,
            clean: false,
            tag: None,
        }
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_tag(mut self, tag: BackupTag) -> Self {
        self.tag = Some(tag);
        self
    }
}
